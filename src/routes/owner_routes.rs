use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};

use crate::controllers::owner_controller::OwnerController;
use crate::dto::owner_dto::PurchaseRequest;
use crate::dto::parking_dto::{CreateSpotRequest, EntryRequest};
use crate::dto::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::parking::{ParkingRecord, ParkingSpot};
use crate::models::purchase::PurchaseRecord;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Rutas de propietario; el router padre aplica `require_owner`
pub fn create_owner_router() -> Router<AppState> {
    Router::new()
        .route("/purchase", post(purchase))
        .route("/purchases", get(purchases))
        .route("/spots", post(create_spot))
        .route("/entry", post(entry))
}

async fn purchase(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<PurchaseRequest>,
) -> Result<Json<ApiResponse<PurchaseRecord>>, AppError> {
    let controller = OwnerController::new(&state);
    Ok(Json(controller.purchase(&user, request).await?))
}

async fn purchases(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<PurchaseRecord>>>, AppError> {
    let controller = OwnerController::new(&state);
    Ok(Json(controller.purchases(&user).await?))
}

async fn create_spot(
    State(state): State<AppState>,
    Json(request): Json<CreateSpotRequest>,
) -> Result<Json<ApiResponse<ParkingSpot>>, AppError> {
    let controller = OwnerController::new(&state);
    Ok(Json(controller.create_spot(request).await?))
}

async fn entry(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<EntryRequest>,
) -> Result<Json<ApiResponse<ParkingRecord>>, AppError> {
    let controller = OwnerController::new(&state);
    Ok(Json(controller.entry(&user, request).await?))
}
