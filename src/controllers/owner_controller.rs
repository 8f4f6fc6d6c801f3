use std::sync::Arc;
use validator::Validate;

use crate::dto::owner_dto::PurchaseRequest;
use crate::dto::parking_dto::{CreateSpotRequest, EntryRequest};
use crate::dto::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::parking::{ParkingRecord, ParkingSpot};
use crate::models::purchase::PurchaseRecord;
use crate::services::{OwnerService, ParkingService};
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub struct OwnerController {
    owners: Arc<OwnerService>,
    parking: Arc<ParkingService>,
}

impl OwnerController {
    pub fn new(state: &AppState) -> Self {
        Self {
            owners: state.owner_service.clone(),
            parking: state.parking_service.clone(),
        }
    }

    pub async fn purchase(
        &self,
        user: &AuthenticatedUser,
        request: PurchaseRequest,
    ) -> AppResult<ApiResponse<PurchaseRecord>> {
        request.validate()?;

        let record = self
            .owners
            .purchase_permanent_spot(user.user_id, request.spot_id, request.price)
            .await?;
        Ok(ApiResponse::success_with_message(record, "Plaza comprada"))
    }

    pub async fn purchases(
        &self,
        user: &AuthenticatedUser,
    ) -> AppResult<ApiResponse<Vec<PurchaseRecord>>> {
        let records = self.owners.list_purchases(user.user_id).await?;
        Ok(ApiResponse::success(records))
    }

    pub async fn create_spot(&self, request: CreateSpotRequest) -> AppResult<ApiResponse<ParkingSpot>> {
        request.validate()?;

        let spot = self
            .parking
            .create_spot(
                request.spot_type,
                request.hourly_rate,
                request.monthly_rate,
                request.notes,
            )
            .await?;
        Ok(ApiResponse::success_with_message(spot, "Plaza creada"))
    }

    pub async fn entry(
        &self,
        user: &AuthenticatedUser,
        request: EntryRequest,
    ) -> AppResult<ApiResponse<ParkingRecord>> {
        request.validate()?;

        let record = self
            .parking
            .process_owner_entry(user.user_id, &request.license)
            .await?;
        Ok(ApiResponse::success_with_message(record, "Entrada registrada"))
    }
}
