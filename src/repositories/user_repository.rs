use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::run_in_transaction;
use crate::models::user::{NewUser, User, UserRole, UserRow};
use crate::utils::errors::{is_unique_violation, AppError, AppResult};

/// Acceso a usuarios y a sus roles
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// true si ya existe un usuario con ese username o ese email
    async fn exists(&self, username: &str, email: &str) -> AppResult<bool>;

    /// Inserta el usuario y sus roles. Una violación de unicidad es `DuplicateUser`.
    async fn create(&self, user: NewUser) -> AppResult<User>;

    /// Concede un rol; no hace nada si el usuario ya lo tiene
    async fn grant_role(&self, user_id: Uuid, role: UserRole) -> AppResult<()>;
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_roles(&self, user_id: Uuid) -> AppResult<Vec<UserRole>> {
        let roles: Vec<(UserRole,)> =
            sqlx::query_as("SELECT role FROM user_roles WHERE user_id = $1 ORDER BY role")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(roles.into_iter().map(|(role,)| role).collect())
    }

    async fn with_roles(&self, row: Option<UserRow>) -> AppResult<Option<User>> {
        match row {
            Some(row) => {
                let roles = self.load_roles(row.id).await?;
                Ok(Some(User::from_row(row, roles)))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        self.with_roles(row).await
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        self.with_roles(row).await
    }

    async fn exists(&self, username: &str, email: &str) -> AppResult<bool> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 OR email = $2)",
        )
        .bind(username)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    async fn create(&self, user: NewUser) -> AppResult<User> {
        let username = user.username.clone();

        let result = run_in_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let row = sqlx::query_as::<_, UserRow>(
                    r#"
                    INSERT INTO users (id, username, password_hash, email, is_active, created_at, updated_at)
                    VALUES ($1, $2, $3, $4, TRUE, NOW(), NOW())
                    RETURNING *
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(&user.username)
                .bind(&user.password_hash)
                .bind(&user.email)
                .fetch_one(&mut **tx)
                .await?;

                for role in &user.roles {
                    sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2)")
                        .bind(row.id)
                        .bind(role)
                        .execute(&mut **tx)
                        .await?;
                }

                Ok(User::from_row(row, user.roles))
            })
        })
        .await;

        match result {
            Err(AppError::Database(e)) if is_unique_violation(&e) => {
                Err(AppError::DuplicateUser(username))
            }
            other => other,
        }
    }

    async fn grant_role(&self, user_id: Uuid, role: UserRole) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO user_roles (user_id, role) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(role)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
