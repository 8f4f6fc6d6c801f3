use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};

use crate::controllers::lease_controller::LeaseController;
use crate::dto::lease_dto::{CreateLeaseRequest, LeaseListQuery};
use crate::dto::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::lease::LeaseOrder;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_lease_router() -> Router<AppState> {
    Router::new().route("/", get(list_leases).post(create_lease))
}

async fn create_lease(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateLeaseRequest>,
) -> Result<Json<ApiResponse<LeaseOrder>>, AppError> {
    let controller = LeaseController::new(&state);
    Ok(Json(controller.create(&user, request).await?))
}

async fn list_leases(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<LeaseListQuery>,
) -> Result<Json<ApiResponse<Vec<LeaseOrder>>>, AppError> {
    let controller = LeaseController::new(&state);
    Ok(Json(controller.list(&user, query).await?))
}
