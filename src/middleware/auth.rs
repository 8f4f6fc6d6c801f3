//! Middleware de autenticación JWT
//!
//! `auth_middleware` verifica el token Bearer e inyecta `AuthenticatedUser`
//! en las extensions. `require_owner` y `require_admin` deben ir detrás de él.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    models::user::UserRole,
    state::AppState,
    utils::errors::{AppError, AppResult},
    utils::jwt::{extract_token_from_header, verify_token},
};

/// Usuario autenticado que se inyecta en las requests
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
    pub roles: Vec<UserRole>,
}

impl AuthenticatedUser {
    pub fn has_role(&self, role: UserRole) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(UserRole::Admin)
    }
}

/// Middleware de autenticación JWT
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Token de autorización requerido".to_string()))?;

    let token = extract_token_from_header(auth_header)?;
    let claims = verify_token(token, &state.config.jwt)?;

    let authenticated_user = AuthenticatedUser {
        user_id: claims.user_id()?,
        username: claims.username,
        roles: claims.roles,
    };

    // Inyectar usuario autenticado en las extensions
    request.extensions_mut().insert(authenticated_user);

    Ok(next.run(request).await)
}

/// Middleware para rutas de propietarios
pub async fn require_owner(request: Request, next: Next) -> AppResult<Response> {
    check_role(&request, UserRole::Owner)?;
    Ok(next.run(request).await)
}

/// Middleware para rutas de administración
pub async fn require_admin(request: Request, next: Next) -> AppResult<Response> {
    check_role(&request, UserRole::Admin)?;
    Ok(next.run(request).await)
}

fn check_role(request: &Request, role: UserRole) -> AppResult<()> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| AppError::Unauthorized("Token de autorización requerido".to_string()))?;

    if !user.has_role(role) {
        tracing::warn!(user_id = %user.user_id, required = %role, "🚫 Rol insuficiente");
        return Err(AppError::Forbidden(format!("Se requiere el rol '{}'", role)));
    }
    Ok(())
}
