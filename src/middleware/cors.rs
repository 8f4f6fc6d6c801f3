//! Middleware de CORS
//!
//! Sin orígenes configurados la política es permisiva; con orígenes,
//! solo se aceptan esos y únicamente los métodos y cabeceras que usa la API.

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::CorsLayer;

/// Elige la política según la configuración
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::very_permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("⚠️ Origen CORS inválido ignorado: {}", origin);
                None
            }
        })
        .collect();

    // El token viaja en la cabecera Authorization, no en cookies
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
