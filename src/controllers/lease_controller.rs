use std::sync::Arc;

use crate::dto::lease_dto::{CreateLeaseRequest, LeaseListQuery};
use crate::dto::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::lease::LeaseOrder;
use crate::services::LeaseService;
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub struct LeaseController {
    leases: Arc<LeaseService>,
}

impl LeaseController {
    pub fn new(state: &AppState) -> Self {
        Self {
            leases: state.lease_service.clone(),
        }
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        request: CreateLeaseRequest,
    ) -> AppResult<ApiResponse<LeaseOrder>> {
        let lease = self
            .leases
            .create_lease(user.user_id, request.spot_id, request.months, request.rate)
            .await?;
        Ok(ApiResponse::success_with_message(lease, "Alquiler creado"))
    }

    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        query: LeaseListQuery,
    ) -> AppResult<ApiResponse<Vec<LeaseOrder>>> {
        let leases = self.leases.list_user_leases(user.user_id, query.status).await?;
        Ok(ApiResponse::success(leases))
    }
}
