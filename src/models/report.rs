//! Modelos de lectura para informes y mantenimiento

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

use super::parking::ParkingType;

/// Agregado diario de registros completados, agrupado por fecha de salida
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub total_income: Decimal,
    pub temporary_count: i64,
    pub short_term_count: i64,
    pub permanent_count: i64,
}

/// Conteo de plazas por tipo
#[derive(Debug, Clone, FromRow)]
pub struct SpotTypeCount {
    pub spot_type: ParkingType,
    pub total: i64,
    pub idle: i64,
}

/// Estado del registro de mantenimiento - mapea al ENUM maintenance_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "maintenance_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStatus {
    Pending,
    Resolved,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MaintenanceRecord {
    pub id: Uuid,
    pub spot_id: Uuid,
    pub description: Option<String>,
    pub reported_by: Option<Uuid>,
    pub status: MaintenanceStatus,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Resumen devuelto por `GenerateDailyReport`
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub days: i64,
    pub total_income: Decimal,
    pub temporary_count: i64,
    pub short_term_count: i64,
    pub permanent_count: i64,
    pub daily: Vec<DailyReport>,
}

impl ReportSummary {
    pub fn from_daily(days: i64, daily: Vec<DailyReport>) -> Self {
        let mut summary = Self {
            days,
            total_income: Decimal::ZERO,
            temporary_count: 0,
            short_term_count: 0,
            permanent_count: 0,
            daily: Vec::new(),
        };
        for row in &daily {
            summary.total_income += row.total_income;
            summary.temporary_count += row.temporary_count;
            summary.short_term_count += row.short_term_count;
            summary.permanent_count += row.permanent_count;
        }
        summary.daily = daily;
        summary
    }
}

/// Estadísticas de ocupación por tipo de plaza
#[derive(Debug, Clone, Serialize)]
pub struct SpotStats {
    pub total_spots: i64,
    pub available_spots: i64,
    /// Porcentaje ocupado por tipo: `(1 - idle/total) * 100`
    pub utilization_rates: std::collections::BTreeMap<String, f64>,
}
