use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::parking::ParkingRecord;
use crate::models::report::{DailyReport, SpotTypeCount};
use crate::utils::errors::AppResult;

#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Ingresos y conteos por tipo de los registros completados en `[from, to]`,
    /// agrupados por fecha de salida
    async fn daily_income(&self, from: DateTime<Utc>, to: DateTime<Utc>)
        -> AppResult<Vec<DailyReport>>;

    async fn spot_type_counts(&self) -> AppResult<Vec<SpotTypeCount>>;

    /// Historial de registros de un usuario, del más reciente al más antiguo
    async fn user_activities(&self, user_id: Uuid) -> AppResult<Vec<ParkingRecord>>;
}

pub struct PgReportRepository {
    pool: PgPool,
}

impl PgReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportRepository for PgReportRepository {
    async fn daily_income(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<DailyReport>> {
        let rows = sqlx::query_as::<_, DailyReport>(
            r#"
            SELECT
                (r.exit_time AT TIME ZONE 'UTC')::date AS date,
                COALESCE(SUM(r.total_cost), 0) AS total_income,
                COUNT(*) FILTER (WHERE s.spot_type = 'temporary') AS temporary_count,
                COUNT(*) FILTER (WHERE s.spot_type = 'short_term') AS short_term_count,
                COUNT(*) FILTER (WHERE s.spot_type = 'permanent') AS permanent_count
            FROM parking_records r
            JOIN parking_spots s ON s.id = r.spot_id
            WHERE r.is_completed AND r.exit_time BETWEEN $1 AND $2
            GROUP BY 1
            ORDER BY 1 DESC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn spot_type_counts(&self) -> AppResult<Vec<SpotTypeCount>> {
        let rows = sqlx::query_as::<_, SpotTypeCount>(
            r#"
            SELECT
                spot_type,
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'idle') AS idle
            FROM parking_spots
            GROUP BY spot_type
            ORDER BY spot_type
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn user_activities(&self, user_id: Uuid) -> AppResult<Vec<ParkingRecord>> {
        let records = sqlx::query_as::<_, ParkingRecord>(
            "SELECT * FROM parking_records WHERE user_id = $1 ORDER BY entry_time DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
