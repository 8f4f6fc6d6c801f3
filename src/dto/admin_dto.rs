use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::dto::auth_dto::UserResponse;
use crate::models::parking::{ParkingSpot, ParkingStatus};
use crate::models::report::MaintenanceStatus;

// Request para cambiar el estado de una plaza
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSpotStatusRequest {
    pub status: ParkingStatus,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

// Request para vincular una plaza a un usuario
#[derive(Debug, Deserialize)]
pub struct BindParkingRequest {
    #[serde(alias = "spot_id")]
    pub parking_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UnbindParkingQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
pub struct MaintenanceQuery {
    pub status: Option<MaintenanceStatus>,
}

// Propietario actual de una plaza
#[derive(Debug, Serialize)]
pub struct BindUserResponse {
    pub parking_id: Uuid,
    pub user_id: Option<Uuid>,
    pub username: Option<String>,
}

// Usuario con las plazas que tiene vinculadas
#[derive(Debug, Serialize)]
pub struct AdminUserResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub parking_spots: Vec<ParkingSpot>,
}
