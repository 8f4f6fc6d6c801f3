//! Servicio de autenticación
//!
//! Registro, login (normal y de administrador) y creación del administrador
//! inicial. Los tokens se firman con `utils::jwt`.

use std::sync::Arc;
use uuid::Uuid;

use crate::config::environment::JwtConfig;
use crate::models::user::{NewUser, User, UserRole};
use crate::repositories::UserRepository;
use crate::utils::errors::{not_found_error, AppError, AppResult};
use crate::utils::jwt::generate_token;

/// Resultado de un login correcto
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user: User,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt: JwtConfig,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, jwt: JwtConfig, bcrypt_cost: u32) -> Self {
        Self {
            users,
            jwt,
            bcrypt_cost,
        }
    }

    /// Registra un usuario nuevo sin roles
    pub async fn register(&self, username: &str, password: &str, email: &str) -> AppResult<User> {
        self.create_user(username, password, email, Vec::new()).await
    }

    /// Login; con `require_admin` exige el rol `admin`
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        require_admin: bool,
    ) -> AppResult<LoginOutcome> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::UserNotFound(username.to_string()))?;

        let valid = verify_password(password, &user.password_hash).await?;
        if !valid {
            tracing::warn!(user_id = %user.id, "🔒 Contraseña incorrecta");
            return Err(AppError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(AppError::Forbidden("User account is disabled".to_string()));
        }

        if require_admin && !user.has_role(UserRole::Admin) {
            tracing::warn!(user_id = %user.id, "🚫 Login de administrador sin rol admin");
            return Err(AppError::Forbidden("Admin role required".to_string()));
        }

        let token = generate_token(user.id, &user.username, &user.roles, &self.jwt)?;
        tracing::info!(user_id = %user.id, admin = require_admin, "🔑 Login correcto");

        Ok(LoginOutcome { token, user })
    }

    pub async fn get_user(&self, user_id: Uuid) -> AppResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| not_found_error("User", &user_id))
    }

    /// Crea el administrador inicial si no existe. Devuelve true si lo ha creado.
    pub async fn ensure_admin(&self, username: &str, password: &str, email: &str) -> AppResult<bool> {
        if let Some(existing) = self.users.find_by_username(username).await? {
            if !existing.has_role(UserRole::Admin) {
                self.users.grant_role(existing.id, UserRole::Admin).await?;
                tracing::info!(user_id = %existing.id, "👑 Rol admin concedido a usuario existente");
            }
            return Ok(false);
        }

        let admin = self
            .create_user(username, password, email, vec![UserRole::Admin])
            .await?;
        tracing::info!(user_id = %admin.id, "👑 Administrador inicial creado");
        Ok(true)
    }

    async fn create_user(
        &self,
        username: &str,
        password: &str,
        email: &str,
        roles: Vec<UserRole>,
    ) -> AppResult<User> {
        if self.users.exists(username, email).await? {
            return Err(AppError::DuplicateUser(username.to_string()));
        }

        let password_hash = hash_password(password, self.bcrypt_cost).await?;

        let user = self
            .users
            .create(NewUser {
                username: username.to_string(),
                password_hash,
                email: email.to_string(),
                roles,
            })
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "👤 Usuario registrado");
        Ok(user)
    }
}

/// bcrypt es CPU intensivo: se ejecuta en el pool de tareas bloqueantes
async fn hash_password(password: &str, cost: u32) -> AppResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("Tarea de hash interrumpida: {}", e)))?
        .map_err(|e| AppError::Hash(format!("Error hasheando contraseña: {}", e)))
}

async fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let password = password.to_string();
    let password_hash = password_hash.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &password_hash))
        .await
        .map_err(|e| AppError::Internal(format!("Tarea de verificación interrumpida: {}", e)))?
        .map_err(|e| AppError::Hash(format!("Error verificando contraseña: {}", e)))
}
