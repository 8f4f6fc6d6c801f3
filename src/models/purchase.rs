use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Compra de una plaza convertida en permanente
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PurchaseRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub spot_id: Uuid,
    pub purchase_price: Decimal,
    pub purchase_date: DateTime<Utc>,
}
