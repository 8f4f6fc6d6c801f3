use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::admin_controller::AdminController;
use crate::dto::admin_dto::{
    AdminUserResponse, BindParkingRequest, BindUserResponse, MaintenanceQuery,
    UnbindParkingQuery, UpdateSpotStatusRequest,
};
use crate::dto::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::parking::{ParkingRecord, ParkingSpot};
use crate::models::report::{MaintenanceRecord, SpotStats};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Rutas protegidas de administración; `/admin/login` se monta aparte
pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        .route("/spots/:id/status", put(update_spot_status))
        .route("/stats", get(stats))
        .route("/bind-parking", post(bind_parking))
        .route("/unbind-parking/:parking_id", delete(unbind_parking))
        .route("/users/:user_id", get(get_user))
        .route("/users/:user_id/activities", get(user_activities))
        .route("/parking/:parking_id/bind-user", get(bound_user))
        .route("/maintenance", get(maintenance))
}

async fn update_spot_status(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateSpotStatusRequest>,
) -> Result<Json<ApiResponse<ParkingSpot>>, AppError> {
    let controller = AdminController::new(&state);
    Ok(Json(controller.update_spot_status(&admin, id, request).await?))
}

async fn stats(State(state): State<AppState>) -> Result<Json<ApiResponse<SpotStats>>, AppError> {
    let controller = AdminController::new(&state);
    Ok(Json(controller.stats().await?))
}

async fn bind_parking(
    State(state): State<AppState>,
    Json(request): Json<BindParkingRequest>,
) -> Result<Json<ApiResponse<ParkingSpot>>, AppError> {
    let controller = AdminController::new(&state);
    Ok(Json(controller.bind_parking(request).await?))
}

async fn unbind_parking(
    State(state): State<AppState>,
    Path(parking_id): Path<Uuid>,
    Query(query): Query<UnbindParkingQuery>,
) -> Result<Json<ApiResponse<ParkingSpot>>, AppError> {
    let controller = AdminController::new(&state);
    Ok(Json(controller.unbind_parking(parking_id, query.user_id).await?))
}

async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<AdminUserResponse>>, AppError> {
    let controller = AdminController::new(&state);
    Ok(Json(controller.get_user(user_id).await?))
}

async fn user_activities(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<ParkingRecord>>>, AppError> {
    let controller = AdminController::new(&state);
    Ok(Json(controller.user_activities(user_id).await?))
}

async fn bound_user(
    State(state): State<AppState>,
    Path(parking_id): Path<Uuid>,
) -> Result<Json<ApiResponse<BindUserResponse>>, AppError> {
    let controller = AdminController::new(&state);
    Ok(Json(controller.bound_user(parking_id).await?))
}

async fn maintenance(
    State(state): State<AppState>,
    Query(query): Query<MaintenanceQuery>,
) -> Result<Json<ApiResponse<Vec<MaintenanceRecord>>>, AppError> {
    let controller = AdminController::new(&state);
    Ok(Json(controller.maintenance(query).await?))
}
