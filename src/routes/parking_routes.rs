use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::parking_controller::ParkingController;
use crate::dto::parking_dto::{EntryRequest, RentRequest};
use crate::dto::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::lease::LeaseOrder;
use crate::models::parking::{ParkingRecord, ParkingSpot, SpotFilter};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_parking_router() -> Router<AppState> {
    Router::new()
        .route("/spots", get(list_spots))
        .route("/entry", post(entry))
        .route("/exit/:id", post(exit))
        .route("/my-spots", get(my_spots))
        .route("/rent", post(rent))
        .route("/records/:id", get(get_record))
}

async fn list_spots(
    State(state): State<AppState>,
    Query(filter): Query<SpotFilter>,
) -> Result<Json<ApiResponse<Vec<ParkingSpot>>>, AppError> {
    let controller = ParkingController::new(&state);
    Ok(Json(controller.list_spots(filter).await?))
}

async fn entry(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<EntryRequest>,
) -> Result<Json<ApiResponse<ParkingRecord>>, AppError> {
    let controller = ParkingController::new(&state);
    Ok(Json(controller.entry(&user, request).await?))
}

async fn exit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ParkingRecord>>, AppError> {
    let controller = ParkingController::new(&state);
    Ok(Json(controller.exit(id).await?))
}

async fn my_spots(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<ParkingSpot>>>, AppError> {
    let controller = ParkingController::new(&state);
    Ok(Json(controller.my_spots(&user).await?))
}

async fn rent(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<RentRequest>,
) -> Result<Json<ApiResponse<LeaseOrder>>, AppError> {
    let controller = ParkingController::new(&state);
    Ok(Json(controller.rent(&user, request).await?))
}

async fn get_record(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ParkingRecord>>, AppError> {
    let controller = ParkingController::new(&state);
    Ok(Json(controller.get_record(&user, id).await?))
}
