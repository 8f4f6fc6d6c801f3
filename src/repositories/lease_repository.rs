use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::run_in_transaction;
use crate::models::lease::{LeaseOrder, LeaseStatus, NewLease};
use crate::utils::errors::{not_found_error, AppResult};

#[async_trait]
pub trait LeaseRepository: Send + Sync {
    /// Inserta el alquiler y fija `expires_at` de la plaza a `end_date`, todo o nada
    async fn create_lease_with_expiry(&self, lease: NewLease) -> AppResult<LeaseOrder>;

    /// Alquileres activos cuyo `end_date` es anterior a `before`
    async fn find_expiring(&self, before: DateTime<Utc>) -> AppResult<Vec<LeaseOrder>>;

    /// Marca el alquiler como expirado y limpia `expires_at` de su plaza
    async fn expire_lease(&self, lease_id: Uuid) -> AppResult<()>;

    async fn list_by_user(
        &self,
        user_id: Uuid,
        status: Option<LeaseStatus>,
    ) -> AppResult<Vec<LeaseOrder>>;
}

pub struct PgLeaseRepository {
    pool: PgPool,
}

impl PgLeaseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeaseRepository for PgLeaseRepository {
    async fn create_lease_with_expiry(&self, lease: NewLease) -> AppResult<LeaseOrder> {
        run_in_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let (spot_id,): (Uuid,) =
                    sqlx::query_as("SELECT id FROM parking_spots WHERE id = $1 FOR UPDATE")
                        .bind(lease.spot_id)
                        .fetch_optional(&mut **tx)
                        .await?
                        .ok_or_else(|| not_found_error("Parking spot", &lease.spot_id))?;

                let order = sqlx::query_as::<_, LeaseOrder>(
                    r#"
                    INSERT INTO lease_orders (id, user_id, spot_id, start_date, end_date, total_price, status, auto_renew, created_at)
                    VALUES ($1, $2, $3, $4, $5, $6, 'active', FALSE, NOW())
                    RETURNING *
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(lease.user_id)
                .bind(spot_id)
                .bind(lease.start_date)
                .bind(lease.end_date)
                .bind(lease.total_price)
                .fetch_one(&mut **tx)
                .await?;

                sqlx::query(
                    "UPDATE parking_spots SET expires_at = $2, updated_at = NOW() WHERE id = $1",
                )
                .bind(spot_id)
                .bind(lease.end_date)
                .execute(&mut **tx)
                .await?;

                Ok(order)
            })
        })
        .await
    }

    async fn find_expiring(&self, before: DateTime<Utc>) -> AppResult<Vec<LeaseOrder>> {
        let leases = sqlx::query_as::<_, LeaseOrder>(
            r#"
            SELECT * FROM lease_orders
            WHERE status = 'active' AND end_date < $1
            ORDER BY end_date
            "#,
        )
        .bind(before)
        .fetch_all(&self.pool)
        .await?;

        Ok(leases)
    }

    async fn expire_lease(&self, lease_id: Uuid) -> AppResult<()> {
        run_in_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let (spot_id,): (Uuid,) = sqlx::query_as(
                    "UPDATE lease_orders SET status = 'expired' WHERE id = $1 RETURNING spot_id",
                )
                .bind(lease_id)
                .fetch_optional(&mut **tx)
                .await?
                .ok_or_else(|| not_found_error("Lease", &lease_id))?;

                sqlx::query(
                    "UPDATE parking_spots SET expires_at = NULL, updated_at = NOW() WHERE id = $1",
                )
                .bind(spot_id)
                .execute(&mut **tx)
                .await?;

                Ok(())
            })
        })
        .await
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        status: Option<LeaseStatus>,
    ) -> AppResult<Vec<LeaseOrder>> {
        let leases = sqlx::query_as::<_, LeaseOrder>(
            r#"
            SELECT * FROM lease_orders
            WHERE user_id = $1 AND ($2::lease_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(leases)
    }
}
