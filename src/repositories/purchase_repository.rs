use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::run_in_transaction;
use crate::models::parking::{ParkingSpot, ParkingStatus};
use crate::models::purchase::PurchaseRecord;
use crate::models::user::UserRole;
use crate::utils::errors::{not_found_error, AppError, AppResult};

#[async_trait]
pub trait PurchaseRepository: Send + Sync {
    /// Convierte la plaza en permanente del comprador, le concede el rol `owner`
    /// y anota la compra, todo o nada. `SpotUnavailable` si la plaza está ocupada.
    async fn purchase_spot(
        &self,
        user_id: Uuid,
        spot_id: Uuid,
        price: Decimal,
    ) -> AppResult<PurchaseRecord>;

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<PurchaseRecord>>;
}

pub struct PgPurchaseRepository {
    pool: PgPool,
}

impl PgPurchaseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PurchaseRepository for PgPurchaseRepository {
    async fn purchase_spot(
        &self,
        user_id: Uuid,
        spot_id: Uuid,
        price: Decimal,
    ) -> AppResult<PurchaseRecord> {
        run_in_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let spot = sqlx::query_as::<_, ParkingSpot>(
                    "SELECT * FROM parking_spots WHERE id = $1 FOR UPDATE",
                )
                .bind(spot_id)
                .fetch_optional(&mut **tx)
                .await?
                .ok_or_else(|| not_found_error("Parking spot", &spot_id))?;

                if !spot.spot_type.can_convert_to_permanent() {
                    return Err(AppError::InvalidConversion(spot.spot_type));
                }

                // Una plaza con un vehículo dentro no cambia de manos
                let (open,): (bool,) = sqlx::query_as(
                    "SELECT EXISTS(SELECT 1 FROM parking_records WHERE spot_id = $1 AND exit_time IS NULL)",
                )
                .bind(spot_id)
                .fetch_one(&mut **tx)
                .await?;
                if open || spot.status == ParkingStatus::Occupied {
                    return Err(AppError::SpotUnavailable(spot_id));
                }

                sqlx::query(
                    r#"
                    UPDATE parking_spots
                    SET spot_type = 'permanent', status = 'idle', owner_id = $2, license = NULL, updated_at = NOW()
                    WHERE id = $1
                    "#,
                )
                .bind(spot_id)
                .bind(user_id)
                .execute(&mut **tx)
                .await?;

                sqlx::query(
                    "INSERT INTO user_roles (user_id, role) VALUES ($1, $2) ON CONFLICT DO NOTHING",
                )
                .bind(user_id)
                .bind(UserRole::Owner)
                .execute(&mut **tx)
                .await?;

                let record = sqlx::query_as::<_, PurchaseRecord>(
                    r#"
                    INSERT INTO purchase_records (id, user_id, spot_id, purchase_price, purchase_date)
                    VALUES ($1, $2, $3, $4, NOW())
                    RETURNING *
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(user_id)
                .bind(spot_id)
                .bind(price)
                .fetch_one(&mut **tx)
                .await?;

                Ok(record)
            })
        })
        .await
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<PurchaseRecord>> {
        let records = sqlx::query_as::<_, PurchaseRecord>(
            "SELECT * FROM purchase_records WHERE user_id = $1 ORDER BY purchase_date DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
