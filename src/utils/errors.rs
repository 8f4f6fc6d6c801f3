//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use uuid::Uuid;

use crate::models::parking::ParkingType;

/// Código SQLSTATE de PostgreSQL para violaciones de unicidad
const UNIQUE_VIOLATION: &str = "23505";

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Hash error: {0}")]
    Hash(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    // Autenticación
    #[error("User '{0}' already exists")]
    DuplicateUser(String),

    #[error("User '{0}' not found")]
    UserNotFound(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    // Ocupación de plazas
    #[error("License '{0}' already has an open parking record")]
    RecordAlreadyOpen(String),

    #[error("No available parking spot")]
    NoAvailableSpot,

    #[error("Parking spot {0} is no longer idle")]
    SpotUnavailable(Uuid),

    #[error("Parking record {0} is already completed")]
    AlreadyCompleted(Uuid),

    // Propiedad de plazas
    #[error("Parking spot {0} is already bound to a user")]
    AlreadyBound(Uuid),

    #[error("Parking spot {0} is not bound to user {1}")]
    NotBoundToUser(Uuid, Uuid),

    #[error("Parking spot of type '{0}' cannot be converted to permanent")]
    InvalidConversion(ParkingType),

    #[error("Parking spot {0} has no owner")]
    NoOwner(Uuid),

    // Vehículos
    #[error("License plate '{0}' is already registered")]
    DuplicateLicense(String),

    #[error("Vehicle {0} not found or not owned by caller")]
    NotFoundOrForbidden(Uuid),
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl AppError {
    /// Código de estado HTTP asociado a cada error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) | AppError::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized(_) | AppError::UserNotFound(_) | AppError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) | AppError::NotFoundOrForbidden(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_)
            | AppError::DuplicateUser(_)
            | AppError::RecordAlreadyOpen(_)
            | AppError::NoAvailableSpot
            | AppError::SpotUnavailable(_)
            | AppError::AlreadyCompleted(_)
            | AppError::AlreadyBound(_)
            | AppError::NotBoundToUser(_, _)
            | AppError::InvalidConversion(_)
            | AppError::NoOwner(_)
            | AppError::DuplicateLicense(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) | AppError::Internal(_) | AppError::Hash(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Código estable para clientes
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DB_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Internal(_) => "INTERNAL_ERROR",
            AppError::Hash(_) => "HASH_ERROR",
            AppError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            AppError::DuplicateUser(_) => "DUPLICATE_USER",
            AppError::UserNotFound(_) | AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::RecordAlreadyOpen(_) => "RECORD_ALREADY_OPEN",
            AppError::NoAvailableSpot => "NO_AVAILABLE_SPOT",
            AppError::SpotUnavailable(_) => "SPOT_UNAVAILABLE",
            AppError::AlreadyCompleted(_) => "ALREADY_COMPLETED",
            AppError::AlreadyBound(_) => "ALREADY_BOUND",
            AppError::NotBoundToUser(_, _) => "NOT_BOUND_TO_USER",
            AppError::InvalidConversion(_) => "INVALID_CONVERSION",
            AppError::NoOwner(_) => "NO_OWNER",
            AppError::DuplicateLicense(_) => "DUPLICATE_LICENSE",
            AppError::NotFoundOrForbidden(_) => "NOT_FOUND_OR_FORBIDDEN",
        }
    }

    /// Mensaje expuesto al cliente; los errores internos no filtran detalles
    fn public_message(&self) -> String {
        match self {
            AppError::Database(_) => "An error occurred while accessing the database".to_string(),
            AppError::Internal(_) => "An unexpected error occurred".to_string(),
            AppError::Hash(_) => "An error occurred while processing credentials".to_string(),
            AppError::Validation(_) => "The provided data is invalid".to_string(),
            AppError::UserNotFound(_) | AppError::InvalidCredentials => {
                "Invalid username or password".to_string()
            }
            AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::BadRequest(msg)
            | AppError::InvalidInput(msg)
            | AppError::ServiceUnavailable(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(code = self.code(), "❌ {}", self);
        } else {
            tracing::warn!(code = self.code(), "⚠️ {}", self);
        }

        let details = match &self {
            AppError::Validation(e) => serde_json::to_value(e).ok(),
            _ => None,
        };

        let body = ErrorResponse {
            error: self.public_message(),
            code: self.code(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Indica si un error de sqlx es una violación de restricción única
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_error) => db_error.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

/// Violación de unicidad sobre un índice o restricción concreta
pub fn is_unique_violation_on(error: &sqlx::Error, constraint: &str) -> bool {
    match error {
        sqlx::Error::Database(db_error) => {
            db_error.code().as_deref() == Some(UNIQUE_VIOLATION)
                && db_error.constraint() == Some(constraint)
        }
        _ => false,
    }
}

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: &Uuid) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

/// Función helper para crear errores de acceso prohibido
pub fn forbidden_error(operation: &str, reason: &str) -> AppError {
    AppError::Forbidden(format!("Cannot {}: {}", operation, reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_map_to_taxonomy() {
        assert_eq!(AppError::NoAvailableSpot.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::AlreadyCompleted(Uuid::new_v4()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::InvalidInput("months".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::UserNotFound("ghost".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::NotFoundOrForbidden(Uuid::new_v4()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            forbidden_error("purchase spot", "owner role required").status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_login_errors_share_public_message() {
        assert_eq!(
            AppError::UserNotFound("ghost".into()).public_message(),
            AppError::InvalidCredentials.public_message()
        );
    }

    #[test]
    fn test_non_database_errors_are_not_unique_violations() {
        let error = sqlx::Error::RowNotFound;
        assert!(!is_unique_violation(&error));
        assert!(!is_unique_violation_on(&error, "idx_parking_records_open_license"));
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let error = AppError::Internal("pool exhausted at 10.0.0.3".into());
        assert!(!error.public_message().contains("10.0.0.3"));
    }
}
