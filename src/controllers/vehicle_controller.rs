use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::dto::vehicle_dto::CreateVehicleRequest;
use crate::dto::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::vehicle::Vehicle;
use crate::services::VehicleService;
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub struct VehicleController {
    vehicles: Arc<VehicleService>,
}

impl VehicleController {
    pub fn new(state: &AppState) -> Self {
        Self {
            vehicles: state.vehicle_service.clone(),
        }
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        request: CreateVehicleRequest,
    ) -> AppResult<ApiResponse<Vehicle>> {
        request.validate()?;

        let vehicle = self
            .vehicles
            .bind_vehicle(user.user_id, &request.license_plate, request.brand, request.model)
            .await?;

        Ok(ApiResponse::success_with_message(
            vehicle,
            "Vehículo registrado exitosamente",
        ))
    }

    pub async fn list(&self, user: &AuthenticatedUser) -> AppResult<ApiResponse<Vec<Vehicle>>> {
        let vehicles = self.vehicles.list_vehicles(user.user_id).await?;
        Ok(ApiResponse::success(vehicles))
    }

    pub async fn delete(&self, user: &AuthenticatedUser, id: Uuid) -> AppResult<ApiResponse<()>> {
        self.vehicles.remove_vehicle(user.user_id, id).await?;
        Ok(ApiResponse::message("Vehículo eliminado exitosamente"))
    }
}
