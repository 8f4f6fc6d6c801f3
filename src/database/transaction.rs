//! Unidad de trabajo transaccional compartida por todos los repositorios

use futures::future::BoxFuture;
use sqlx::{PgPool, Postgres, Transaction};

use crate::utils::errors::AppResult;

/// Ejecuta `unit_of_work` dentro de una transacción.
///
/// Hace commit si el closure devuelve `Ok` y rollback si devuelve `Err`.
/// El closure debe mover sus datos (`async move`).
///
/// ```ignore
/// run_in_transaction(&pool, move |tx| Box::pin(async move {
///     sqlx::query("UPDATE ...").execute(&mut **tx).await?;
///     Ok(())
/// })).await
/// ```
pub async fn run_in_transaction<T, F>(pool: &PgPool, unit_of_work: F) -> AppResult<T>
where
    T: Send,
    F: for<'c> FnOnce(&'c mut Transaction<'static, Postgres>) -> BoxFuture<'c, AppResult<T>>
        + Send,
{
    let mut tx = pool.begin().await?;

    match unit_of_work(&mut tx).await {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!("⚠️ Rollback fallido: {}", rollback_err);
            }
            Err(err)
        }
    }
}
