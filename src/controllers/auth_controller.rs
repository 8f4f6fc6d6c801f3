use std::sync::Arc;
use validator::Validate;

use crate::dto::auth_dto::{LoginRequest, LoginResponse, RegisterRequest, UserResponse};
use crate::dto::ApiResponse;
use crate::services::AuthService;
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub struct AuthController {
    auth: Arc<AuthService>,
    expires_in: u64,
}

impl AuthController {
    pub fn new(state: &AppState) -> Self {
        Self {
            auth: state.auth_service.clone(),
            expires_in: state.config.jwt.expiration_secs,
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<ApiResponse<UserResponse>> {
        request.validate()?;

        let user = self
            .auth
            .register(&request.username, &request.password, &request.email)
            .await?;

        Ok(ApiResponse::success_with_message(
            UserResponse::from(user),
            "Usuario registrado exitosamente",
        ))
    }

    pub async fn login(
        &self,
        request: LoginRequest,
        require_admin: bool,
    ) -> AppResult<ApiResponse<LoginResponse>> {
        request.validate()?;

        let outcome = self
            .auth
            .login(&request.username, &request.password, require_admin)
            .await?;

        Ok(ApiResponse::success(LoginResponse {
            token: outcome.token,
            token_type: "Bearer".to_string(),
            expires_in: self.expires_in,
            user: UserResponse::from(outcome.user),
        }))
    }
}
