//! Middleware del sistema
//!
//! Autenticación JWT, comprobación de roles, CORS y tiempo máximo por petición.

pub mod auth;
pub mod cors;
pub mod timeout;

pub use auth::*;
pub use cors::*;
pub use timeout::*;
