//! Soporte para las pruebas contra PostgreSQL
//!
//! Se ejecutan solo si `TEST_DATABASE_URL` apunta a una base de datos de
//! pruebas; sin ella cada prueba se salta con un aviso.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::env;
use uuid::Uuid;

use parking_manager::database::run_migrations;
use parking_manager::models::user::{NewUser, User, UserRole};
use parking_manager::repositories::{PgUserRepository, UserRepository};

pub async fn test_pool() -> Option<PgPool> {
    dotenvy::dotenv().ok();
    let Ok(url) = env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL no definida: prueba omitida");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("connect test db");
    run_migrations(&pool).await.expect("migrations");
    Some(pool)
}

/// Sufijo único para que las pruebas no choquen entre sí en la misma base de datos
pub fn unique(prefix: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("{}{}", prefix, &suffix[..8])
}

pub async fn create_user(pool: &PgPool, roles: Vec<UserRole>) -> User {
    let name = unique("user");
    PgUserRepository::new(pool.clone())
        .create(NewUser {
            username: name.clone(),
            password_hash: "not-a-real-hash".to_string(),
            email: format!("{}@parking.test", name.to_lowercase()),
            roles,
        })
        .await
        .expect("create user")
}
