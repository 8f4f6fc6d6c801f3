//! DTOs de la API: cuerpos de petición, parámetros de consulta y respuestas

pub mod admin_dto;
pub mod auth_dto;
pub mod common;
pub mod lease_dto;
pub mod owner_dto;
pub mod parking_dto;
pub mod report_dto;
pub mod vehicle_dto;

pub use common::ApiResponse;
