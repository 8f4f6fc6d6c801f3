//! Routers HTTP y composición de la aplicación

pub mod admin_routes;
pub mod auth_routes;
pub mod lease_routes;
pub mod owner_routes;
pub mod parking_routes;
pub mod report_routes;
pub mod vehicle_routes;

use axum::{
    error_handling::HandleErrorLayer,
    middleware::{from_fn, from_fn_with_state},
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::middleware::{auth_middleware, cors_layer, handle_timeout_error, require_admin, require_owner};
use crate::state::AppState;

/// Construye el router completo con sus capas
pub fn create_app_router(state: AppState) -> Router {
    let config = state.config.clone();

    let admin = Router::new()
        .route("/login", post(auth_routes::admin_login))
        .merge(
            admin_routes::create_admin_router()
                .route_layer(from_fn(require_admin))
                .route_layer(from_fn_with_state(state.clone(), auth_middleware)),
        );

    let protected = Router::new()
        .nest("/vehicles", vehicle_routes::create_vehicle_router())
        .nest("/parking", parking_routes::create_parking_router())
        .nest("/lease", lease_routes::create_lease_router())
        .nest("/reports", report_routes::create_report_router())
        .nest(
            "/owner",
            owner_routes::create_owner_router().route_layer(from_fn(require_owner)),
        )
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth_routes::create_auth_router())
        .nest("/admin", admin)
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout_error))
                .timeout(Duration::from_secs(config.request_timeout_secs)),
        )
        .layer(CompressionLayer::new())
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
