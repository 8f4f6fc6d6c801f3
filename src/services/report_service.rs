use chrono::{Duration, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::parking::ParkingRecord;
use crate::models::report::{ReportSummary, SpotStats};
use crate::repositories::ReportRepository;
use crate::utils::errors::{AppError, AppResult};

pub const DEFAULT_REPORT_DAYS: i64 = 7;
pub const MAX_REPORT_DAYS: i64 = 365;

/// Informes agregados sobre registros y plazas
pub struct ReportService {
    reports: Arc<dyn ReportRepository>,
}

impl ReportService {
    pub fn new(reports: Arc<dyn ReportRepository>) -> Self {
        Self { reports }
    }

    /// Ingresos y conteos de los registros completados en los últimos `days` días
    pub async fn generate_daily_report(&self, days: i64) -> AppResult<ReportSummary> {
        if !(1..=MAX_REPORT_DAYS).contains(&days) {
            return Err(AppError::InvalidInput(format!(
                "days must be between 1 and {}",
                MAX_REPORT_DAYS
            )));
        }

        let to = Utc::now();
        let from = to - Duration::days(days);
        let daily = self.reports.daily_income(from, to).await?;

        Ok(ReportSummary::from_daily(days, daily))
    }

    /// Utilización por tipo: `(1 - idle/total) * 100`
    pub async fn get_spot_stats(&self) -> AppResult<SpotStats> {
        let counts = self.reports.spot_type_counts().await?;

        let mut stats = SpotStats {
            total_spots: 0,
            available_spots: 0,
            utilization_rates: BTreeMap::new(),
        };
        for row in counts {
            stats.total_spots += row.total;
            stats.available_spots += row.idle;
            if row.total > 0 {
                let rate = (1.0 - row.idle as f64 / row.total as f64) * 100.0;
                stats
                    .utilization_rates
                    .insert(row.spot_type.as_str().to_string(), rate);
            }
        }
        Ok(stats)
    }

    pub async fn get_user_activities(&self, user_id: Uuid) -> AppResult<Vec<ParkingRecord>> {
        let records = self.reports.user_activities(user_id).await?;
        tracing::debug!(user_id = %user_id, count = records.len(), "📜 Historial de usuario");
        Ok(records)
    }
}
