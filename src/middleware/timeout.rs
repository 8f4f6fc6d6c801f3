//! Tiempo máximo por petición
//!
//! Se monta con `HandleErrorLayer::new(handle_timeout_error)` delante de un
//! `TimeoutLayer`. Al vencer el plazo se descarta el futuro del handler, y con
//! él la consulta en curso; el cliente recibe 503.

use axum::{response::IntoResponse, response::Response, BoxError};

use crate::utils::errors::AppError;

/// Convierte los errores de la pila tower en respuestas
pub async fn handle_timeout_error(error: BoxError) -> Response {
    if error.is::<tower::timeout::error::Elapsed>() {
        AppError::ServiceUnavailable("request timed out".to_string()).into_response()
    } else {
        AppError::Internal(format!("Unhandled middleware error: {}", error)).into_response()
    }
}
