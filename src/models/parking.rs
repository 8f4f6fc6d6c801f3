//! Modelo de plazas de aparcamiento y registros de estancia
//!
//! Mapea las tablas `parking_spots` y `parking_records`. Una plaza en
//! `occupied` siempre tiene exactamente un registro abierto (sin `exit_time`).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::fmt;
use uuid::Uuid;

/// Tipo de plaza - mapea al ENUM parking_type
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Type,
)]
#[sqlx(type_name = "parking_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ParkingType {
    Permanent,
    ShortTerm,
    Temporary,
}

impl ParkingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParkingType::Permanent => "permanent",
            ParkingType::ShortTerm => "short_term",
            ParkingType::Temporary => "temporary",
        }
    }

    /// Solo las plazas temporales o de alquiler corto se pueden comprar
    pub fn can_convert_to_permanent(&self) -> bool {
        match self {
            ParkingType::Temporary | ParkingType::ShortTerm => true,
            ParkingType::Permanent => false,
        }
    }
}

impl fmt::Display for ParkingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Estado de la plaza - mapea al ENUM parking_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "parking_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ParkingStatus {
    Idle,
    Occupied,
    Faulty,
}

impl ParkingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParkingStatus::Idle => "idle",
            ParkingStatus::Occupied => "occupied",
            ParkingStatus::Faulty => "faulty",
        }
    }
}

impl fmt::Display for ParkingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plaza de aparcamiento
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ParkingSpot {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub spot_type: ParkingType,
    pub status: ParkingStatus,
    pub owner_id: Option<Uuid>,
    pub license: Option<String>,
    pub hourly_rate: Decimal,
    pub monthly_rate: Decimal,
    pub expires_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Datos para crear una plaza
#[derive(Debug, Clone)]
pub struct NewParkingSpot {
    pub spot_type: ParkingType,
    pub hourly_rate: Decimal,
    pub monthly_rate: Decimal,
    pub notes: Option<String>,
}

/// Registro de entrada/salida de un vehículo
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ParkingRecord {
    pub id: Uuid,
    pub spot_id: Uuid,
    pub user_id: Option<Uuid>,
    pub license: String,
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
    pub total_cost: Decimal,
    pub is_completed: bool,
    pub vehicle_id: Option<Uuid>,
}

impl ParkingRecord {
    pub fn is_open(&self) -> bool {
        self.exit_time.is_none()
    }
}

/// Datos para abrir un registro al ocupar una plaza
#[derive(Debug, Clone)]
pub struct OccupyRequest {
    pub spot_id: Uuid,
    pub license: String,
    pub user_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
}

/// Filtros para listar plazas
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotFilter {
    #[serde(rename = "type")]
    pub spot_type: Option<ParkingType>,
    pub status: Option<ParkingStatus>,
    pub owner_id: Option<Uuid>,
    #[serde(skip)]
    pub updated_before: Option<DateTime<Utc>>,
}

impl SpotFilter {
    pub fn matches(&self, spot: &ParkingSpot) -> bool {
        self.spot_type.map_or(true, |t| spot.spot_type == t)
            && self.status.map_or(true, |s| spot.status == s)
            && self.owner_id.map_or(true, |o| spot.owner_id == Some(o))
            && self.updated_before.map_or(true, |ts| spot.updated_at < ts)
    }
}
