//! Módulo de base de datos
//!
//! Maneja la conexión, las migraciones y las transacciones con PostgreSQL

pub mod connection;
pub mod transaction;

pub use connection::{create_pool, run_migrations};
pub use transaction::run_in_transaction;
