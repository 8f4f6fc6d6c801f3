//! Modelo de LeaseOrder
//!
//! Un alquiler enlaza un usuario con una plaza y extiende el `expires_at`
//! de la plaza hasta su `end_date`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado del alquiler - mapea al ENUM lease_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "lease_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LeaseStatus {
    Active,
    Expired,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LeaseOrder {
    pub id: Uuid,
    pub user_id: Uuid,
    pub spot_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_price: Decimal,
    pub status: LeaseStatus,
    pub auto_renew: bool,
    pub created_at: DateTime<Utc>,
}

/// Datos para crear un alquiler
#[derive(Debug, Clone)]
pub struct NewLease {
    pub user_id: Uuid,
    pub spot_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_price: Decimal,
}
