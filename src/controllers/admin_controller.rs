use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::dto::admin_dto::{
    AdminUserResponse, BindParkingRequest, BindUserResponse, MaintenanceQuery,
    UpdateSpotStatusRequest,
};
use crate::dto::auth_dto::UserResponse;
use crate::dto::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::parking::{ParkingRecord, ParkingSpot};
use crate::models::report::{MaintenanceRecord, SpotStats};
use crate::services::{AuthService, ParkingService, ReportService};
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub struct AdminController {
    auth: Arc<AuthService>,
    parking: Arc<ParkingService>,
    reports: Arc<ReportService>,
}

impl AdminController {
    pub fn new(state: &AppState) -> Self {
        Self {
            auth: state.auth_service.clone(),
            parking: state.parking_service.clone(),
            reports: state.report_service.clone(),
        }
    }

    pub async fn update_spot_status(
        &self,
        admin: &AuthenticatedUser,
        spot_id: Uuid,
        request: UpdateSpotStatusRequest,
    ) -> AppResult<ApiResponse<ParkingSpot>> {
        request.validate()?;

        let spot = self
            .parking
            .update_spot_status(spot_id, request.status, request.notes, Some(admin.user_id))
            .await?;
        Ok(ApiResponse::success_with_message(spot, "Estado actualizado"))
    }

    pub async fn stats(&self) -> AppResult<ApiResponse<SpotStats>> {
        let stats = self.reports.get_spot_stats().await?;
        Ok(ApiResponse::success(stats))
    }

    pub async fn bind_parking(&self, request: BindParkingRequest) -> AppResult<ApiResponse<ParkingSpot>> {
        let spot = self
            .parking
            .bind_parking_to_user(request.parking_id, request.user_id)
            .await?;
        Ok(ApiResponse::success_with_message(spot, "Plaza vinculada"))
    }

    pub async fn unbind_parking(
        &self,
        spot_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<ApiResponse<ParkingSpot>> {
        let spot = self.parking.unbind_parking(spot_id, user_id).await?;
        Ok(ApiResponse::success_with_message(spot, "Plaza desvinculada"))
    }

    pub async fn bound_user(&self, spot_id: Uuid) -> AppResult<ApiResponse<BindUserResponse>> {
        let (spot, owner) = self.parking.get_bound_user(spot_id).await?;
        Ok(ApiResponse::success(BindUserResponse {
            parking_id: spot.id,
            user_id: owner.as_ref().map(|u| u.id),
            username: owner.map(|u| u.username),
        }))
    }

    pub async fn get_user(&self, user_id: Uuid) -> AppResult<ApiResponse<AdminUserResponse>> {
        let user = self.auth.get_user(user_id).await?;
        let parking_spots = self.parking.get_user_spots(user.id).await?;
        Ok(ApiResponse::success(AdminUserResponse {
            user: UserResponse::from(user),
            parking_spots,
        }))
    }

    /// Historial de entradas y salidas de un usuario existente
    pub async fn user_activities(
        &self,
        user_id: Uuid,
    ) -> AppResult<ApiResponse<Vec<ParkingRecord>>> {
        let user = self.auth.get_user(user_id).await?;
        let records = self.reports.get_user_activities(user.id).await?;
        Ok(ApiResponse::success(records))
    }

    pub async fn maintenance(
        &self,
        query: MaintenanceQuery,
    ) -> AppResult<ApiResponse<Vec<MaintenanceRecord>>> {
        let records = self.parking.list_maintenance(query.status).await?;
        Ok(ApiResponse::success(records))
    }
}
