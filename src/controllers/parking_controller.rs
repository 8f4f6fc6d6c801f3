use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::dto::parking_dto::{EntryRequest, RentRequest};
use crate::dto::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::lease::LeaseOrder;
use crate::models::parking::{ParkingRecord, ParkingSpot, SpotFilter};
use crate::services::{ParkingService, VehicleService};
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub struct ParkingController {
    parking: Arc<ParkingService>,
    vehicles: Arc<VehicleService>,
}

impl ParkingController {
    pub fn new(state: &AppState) -> Self {
        Self {
            parking: state.parking_service.clone(),
            vehicles: state.vehicle_service.clone(),
        }
    }

    pub async fn list_spots(&self, filter: SpotFilter) -> AppResult<ApiResponse<Vec<ParkingSpot>>> {
        let spots = self.parking.list_spots(&filter).await?;
        Ok(ApiResponse::success(spots))
    }

    pub async fn my_spots(&self, user: &AuthenticatedUser) -> AppResult<ApiResponse<Vec<ParkingSpot>>> {
        let spots = self.parking.get_user_spots(user.user_id).await?;
        Ok(ApiResponse::success(spots))
    }

    pub async fn entry(
        &self,
        user: &AuthenticatedUser,
        request: EntryRequest,
    ) -> AppResult<ApiResponse<ParkingRecord>> {
        request.validate()?;

        let record = self
            .parking
            .process_entry(&request.license, Some(user.user_id))
            .await?;
        Ok(ApiResponse::success_with_message(record, "Entrada registrada"))
    }

    pub async fn exit(&self, record_id: Uuid) -> AppResult<ApiResponse<ParkingRecord>> {
        let record = self.parking.process_exit(record_id).await?;
        Ok(ApiResponse::success_with_message(record, "Salida registrada"))
    }

    pub async fn get_record(
        &self,
        user: &AuthenticatedUser,
        record_id: Uuid,
    ) -> AppResult<ApiResponse<ParkingRecord>> {
        let record = self
            .parking
            .get_record(record_id, user.user_id, user.is_admin())
            .await?;
        Ok(ApiResponse::success(record))
    }

    pub async fn rent(
        &self,
        user: &AuthenticatedUser,
        request: RentRequest,
    ) -> AppResult<ApiResponse<LeaseOrder>> {
        let lease = self
            .vehicles
            .publish_spot_for_rent(user.user_id, request.spot_id, request.rate, request.months)
            .await?;
        Ok(ApiResponse::success_with_message(lease, "Plaza publicada en alquiler"))
    }
}
