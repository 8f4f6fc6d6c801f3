//! Modelos de dominio
//!
//! Estructuras que mapean las tablas de PostgreSQL y las enumeraciones
//! cerradas que usa la lógica de negocio.

pub mod lease;
pub mod parking;
pub mod purchase;
pub mod report;
pub mod user;
pub mod vehicle;
