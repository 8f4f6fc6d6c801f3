//! Backend de gestión de aparcamiento
//!
//! API REST para plazas, entradas y salidas, alquileres mensuales, compras de
//! plazas permanentes y vehículos de usuario, con tareas programadas de
//! mantenimiento.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod scheduler;
pub mod services;
pub mod state;
pub mod utils;
