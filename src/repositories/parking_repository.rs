//! Repositorio de plazas, registros de estancia y mantenimiento
//!
//! Las operaciones que tocan varias filas (`occupy_spot`, `release_spot`,
//! `bind_owner`...) se ejecutan en una sola transacción con `FOR UPDATE`
//! sobre la fila disputada.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::run_in_transaction;
use crate::models::parking::{
    NewParkingSpot, OccupyRequest, ParkingRecord, ParkingSpot, ParkingStatus, SpotFilter,
};
use crate::models::report::{MaintenanceRecord, MaintenanceStatus};
use crate::models::user::UserRole;
use crate::utils::errors::{is_unique_violation_on, not_found_error, AppError, AppResult};

const OPEN_LICENSE_INDEX: &str = "idx_parking_records_open_license";
const OPEN_SPOT_INDEX: &str = "idx_parking_records_open_spot";

/// Cambio de estado solicitado por un operador
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub spot_id: Uuid,
    pub status: ParkingStatus,
    pub notes: Option<String>,
    pub reported_by: Option<Uuid>,
}

#[async_trait]
pub trait ParkingRepository: Send + Sync {
    async fn create_spot(&self, spot: NewParkingSpot) -> AppResult<ParkingSpot>;

    async fn find_spot(&self, id: Uuid) -> AppResult<Option<ParkingSpot>>;

    /// Plazas que cumplen el filtro, ordenadas por `created_at, id`
    async fn list_spots(&self, filter: &SpotFilter) -> AppResult<Vec<ParkingSpot>>;

    async fn find_record(&self, id: Uuid) -> AppResult<Option<ParkingRecord>>;

    async fn find_open_record_by_license(&self, license: &str) -> AppResult<Option<ParkingRecord>>;

    async fn find_open_record_by_spot(&self, spot_id: Uuid) -> AppResult<Option<ParkingRecord>>;

    /// Bloquea la plaza, comprueba que sigue libre, abre el registro y la marca ocupada.
    ///
    /// `SpotUnavailable` si otra entrada la ocupó primero; `RecordAlreadyOpen`
    /// si la matrícula ya tiene un registro abierto.
    async fn occupy_spot(&self, request: OccupyRequest) -> AppResult<ParkingRecord>;

    /// Bloquea el registro, lo cierra y libera la plaza. Devuelve el registro cerrado.
    async fn release_spot(&self, record_id: Uuid) -> AppResult<ParkingRecord>;

    async fn set_record_cost(&self, record_id: Uuid, cost: Decimal) -> AppResult<()>;

    /// Sobrescribe estado y notas; abre o resuelve registros de mantenimiento
    async fn update_spot_status(&self, change: StatusChange) -> AppResult<ParkingSpot>;

    /// Pasa a `idle` las plazas averiadas sin cambios desde `before`. Devuelve sus ids.
    async fn reset_faulty_spots(&self, before: DateTime<Utc>) -> AppResult<Vec<Uuid>>;

    /// Asigna propietario y concede el rol `owner` en la misma transacción
    async fn bind_owner(&self, spot_id: Uuid, user_id: Uuid) -> AppResult<ParkingSpot>;

    async fn unbind_owner(&self, spot_id: Uuid, user_id: Uuid) -> AppResult<ParkingSpot>;

    async fn list_maintenance(
        &self,
        status: Option<MaintenanceStatus>,
    ) -> AppResult<Vec<MaintenanceRecord>>;
}

pub struct PgParkingRepository {
    pool: PgPool,
}

impl PgParkingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ParkingRepository for PgParkingRepository {
    async fn create_spot(&self, spot: NewParkingSpot) -> AppResult<ParkingSpot> {
        let spot = sqlx::query_as::<_, ParkingSpot>(
            r#"
            INSERT INTO parking_spots (id, spot_type, status, hourly_rate, monthly_rate, notes, created_at, updated_at)
            VALUES ($1, $2, 'idle', $3, $4, $5, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(spot.spot_type)
        .bind(spot.hourly_rate)
        .bind(spot.monthly_rate)
        .bind(spot.notes)
        .fetch_one(&self.pool)
        .await?;

        Ok(spot)
    }

    async fn find_spot(&self, id: Uuid) -> AppResult<Option<ParkingSpot>> {
        let spot = sqlx::query_as::<_, ParkingSpot>("SELECT * FROM parking_spots WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(spot)
    }

    async fn list_spots(&self, filter: &SpotFilter) -> AppResult<Vec<ParkingSpot>> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM parking_spots WHERE TRUE");

        if let Some(spot_type) = filter.spot_type {
            query.push(" AND spot_type = ").push_bind(spot_type);
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status);
        }
        if let Some(owner_id) = filter.owner_id {
            query.push(" AND owner_id = ").push_bind(owner_id);
        }
        if let Some(before) = filter.updated_before {
            query.push(" AND updated_at < ").push_bind(before);
        }
        query.push(" ORDER BY created_at, id");

        let spots = query
            .build_query_as::<ParkingSpot>()
            .fetch_all(&self.pool)
            .await?;

        Ok(spots)
    }

    async fn find_record(&self, id: Uuid) -> AppResult<Option<ParkingRecord>> {
        let record =
            sqlx::query_as::<_, ParkingRecord>("SELECT * FROM parking_records WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(record)
    }

    async fn find_open_record_by_license(&self, license: &str) -> AppResult<Option<ParkingRecord>> {
        let record = sqlx::query_as::<_, ParkingRecord>(
            "SELECT * FROM parking_records WHERE license = $1 AND exit_time IS NULL LIMIT 1",
        )
        .bind(license)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_open_record_by_spot(&self, spot_id: Uuid) -> AppResult<Option<ParkingRecord>> {
        let record = sqlx::query_as::<_, ParkingRecord>(
            "SELECT * FROM parking_records WHERE spot_id = $1 AND exit_time IS NULL LIMIT 1",
        )
        .bind(spot_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn occupy_spot(&self, request: OccupyRequest) -> AppResult<ParkingRecord> {
        let license = request.license.clone();
        let spot_id = request.spot_id;

        let result = run_in_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let spot = sqlx::query_as::<_, ParkingSpot>(
                    "SELECT * FROM parking_spots WHERE id = $1 FOR UPDATE",
                )
                .bind(request.spot_id)
                .fetch_optional(&mut **tx)
                .await?
                .ok_or_else(|| not_found_error("Parking spot", &request.spot_id))?;

                if spot.status != ParkingStatus::Idle {
                    return Err(AppError::SpotUnavailable(spot.id));
                }

                let (open,): (bool,) = sqlx::query_as(
                    "SELECT EXISTS(SELECT 1 FROM parking_records WHERE license = $1 AND exit_time IS NULL)",
                )
                .bind(&request.license)
                .fetch_one(&mut **tx)
                .await?;
                if open {
                    return Err(AppError::RecordAlreadyOpen(request.license));
                }

                let record = sqlx::query_as::<_, ParkingRecord>(
                    r#"
                    INSERT INTO parking_records (id, spot_id, user_id, vehicle_id, license, entry_time, total_cost, is_completed)
                    VALUES ($1, $2, $3, $4, $5, NOW(), 0, FALSE)
                    RETURNING *
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(spot.id)
                .bind(request.user_id)
                .bind(request.vehicle_id)
                .bind(&request.license)
                .fetch_one(&mut **tx)
                .await?;

                sqlx::query(
                    "UPDATE parking_spots SET status = 'occupied', license = $2, updated_at = NOW() WHERE id = $1",
                )
                .bind(spot.id)
                .bind(&request.license)
                .execute(&mut **tx)
                .await?;

                Ok(record)
            })
        })
        .await;

        // Dos entradas simultáneas de la misma matrícula en plazas distintas
        // solo se detectan en el índice único de registros abiertos
        match result {
            Err(AppError::Database(e)) if is_unique_violation_on(&e, OPEN_LICENSE_INDEX) => {
                Err(AppError::RecordAlreadyOpen(license))
            }
            Err(AppError::Database(e)) if is_unique_violation_on(&e, OPEN_SPOT_INDEX) => {
                Err(AppError::SpotUnavailable(spot_id))
            }
            other => other,
        }
    }

    async fn release_spot(&self, record_id: Uuid) -> AppResult<ParkingRecord> {
        run_in_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let record = sqlx::query_as::<_, ParkingRecord>(
                    "SELECT * FROM parking_records WHERE id = $1 FOR UPDATE",
                )
                .bind(record_id)
                .fetch_optional(&mut **tx)
                .await?
                .ok_or_else(|| not_found_error("Parking record", &record_id))?;

                if record.is_completed {
                    return Err(AppError::AlreadyCompleted(record.id));
                }

                let closed = sqlx::query_as::<_, ParkingRecord>(
                    r#"
                    UPDATE parking_records
                    SET exit_time = NOW(), is_completed = TRUE
                    WHERE id = $1
                    RETURNING *
                    "#,
                )
                .bind(record.id)
                .fetch_one(&mut **tx)
                .await?;

                sqlx::query(
                    "UPDATE parking_spots SET status = 'idle', license = NULL, updated_at = NOW() WHERE id = $1",
                )
                .bind(record.spot_id)
                .execute(&mut **tx)
                .await?;

                Ok(closed)
            })
        })
        .await
    }

    async fn set_record_cost(&self, record_id: Uuid, cost: Decimal) -> AppResult<()> {
        sqlx::query("UPDATE parking_records SET total_cost = $2 WHERE id = $1")
            .bind(record_id)
            .bind(cost)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn update_spot_status(&self, change: StatusChange) -> AppResult<ParkingSpot> {
        run_in_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let spot = sqlx::query_as::<_, ParkingSpot>(
                    r#"
                    UPDATE parking_spots
                    SET status = $2, notes = $3, updated_at = NOW()
                    WHERE id = $1
                    RETURNING *
                    "#,
                )
                .bind(change.spot_id)
                .bind(change.status)
                .bind(&change.notes)
                .fetch_optional(&mut **tx)
                .await?
                .ok_or_else(|| not_found_error("Parking spot", &change.spot_id))?;

                match change.status {
                    ParkingStatus::Faulty => {
                        sqlx::query(
                            r#"
                            INSERT INTO maintenance_records (id, spot_id, description, reported_by, status, created_at)
                            VALUES ($1, $2, $3, $4, 'pending', NOW())
                            "#,
                        )
                        .bind(Uuid::new_v4())
                        .bind(spot.id)
                        .bind(&change.notes)
                        .bind(change.reported_by)
                        .execute(&mut **tx)
                        .await?;
                    }
                    ParkingStatus::Idle => {
                        sqlx::query(
                            r#"
                            UPDATE maintenance_records
                            SET status = 'resolved', resolved_at = NOW()
                            WHERE spot_id = $1 AND status = 'pending'
                            "#,
                        )
                        .bind(spot.id)
                        .execute(&mut **tx)
                        .await?;
                    }
                    ParkingStatus::Occupied => {}
                }

                Ok(spot)
            })
        })
        .await
    }

    async fn reset_faulty_spots(&self, before: DateTime<Utc>) -> AppResult<Vec<Uuid>> {
        run_in_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let ids: Vec<(Uuid,)> = sqlx::query_as(
                    r#"
                    UPDATE parking_spots
                    SET status = 'idle', updated_at = NOW()
                    WHERE status = 'faulty' AND updated_at < $1
                    RETURNING id
                    "#,
                )
                .bind(before)
                .fetch_all(&mut **tx)
                .await?;

                let ids: Vec<Uuid> = ids.into_iter().map(|(id,)| id).collect();

                if !ids.is_empty() {
                    sqlx::query(
                        r#"
                        UPDATE maintenance_records
                        SET status = 'resolved', resolved_at = NOW()
                        WHERE spot_id = ANY($1) AND status = 'pending'
                        "#,
                    )
                    .bind(&ids)
                    .execute(&mut **tx)
                    .await?;
                }

                Ok(ids)
            })
        })
        .await
    }

    async fn bind_owner(&self, spot_id: Uuid, user_id: Uuid) -> AppResult<ParkingSpot> {
        run_in_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let spot = sqlx::query_as::<_, ParkingSpot>(
                    "SELECT * FROM parking_spots WHERE id = $1 FOR UPDATE",
                )
                .bind(spot_id)
                .fetch_optional(&mut **tx)
                .await?
                .ok_or_else(|| not_found_error("Parking spot", &spot_id))?;

                if spot.owner_id.is_some() {
                    return Err(AppError::AlreadyBound(spot.id));
                }

                let (user_exists,): (bool,) =
                    sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                        .bind(user_id)
                        .fetch_one(&mut **tx)
                        .await?;
                if !user_exists {
                    return Err(not_found_error("User", &user_id));
                }

                let spot = sqlx::query_as::<_, ParkingSpot>(
                    "UPDATE parking_spots SET owner_id = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
                )
                .bind(spot_id)
                .bind(user_id)
                .fetch_one(&mut **tx)
                .await?;

                sqlx::query(
                    "INSERT INTO user_roles (user_id, role) VALUES ($1, $2) ON CONFLICT DO NOTHING",
                )
                .bind(user_id)
                .bind(UserRole::Owner)
                .execute(&mut **tx)
                .await?;

                Ok(spot)
            })
        })
        .await
    }

    async fn unbind_owner(&self, spot_id: Uuid, user_id: Uuid) -> AppResult<ParkingSpot> {
        run_in_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let spot = sqlx::query_as::<_, ParkingSpot>(
                    "SELECT * FROM parking_spots WHERE id = $1 FOR UPDATE",
                )
                .bind(spot_id)
                .fetch_optional(&mut **tx)
                .await?
                .ok_or_else(|| not_found_error("Parking spot", &spot_id))?;

                if spot.owner_id != Some(user_id) {
                    return Err(AppError::NotBoundToUser(spot_id, user_id));
                }

                let spot = sqlx::query_as::<_, ParkingSpot>(
                    "UPDATE parking_spots SET owner_id = NULL, updated_at = NOW() WHERE id = $1 RETURNING *",
                )
                .bind(spot_id)
                .fetch_one(&mut **tx)
                .await?;

                Ok(spot)
            })
        })
        .await
    }

    async fn list_maintenance(
        &self,
        status: Option<MaintenanceStatus>,
    ) -> AppResult<Vec<MaintenanceRecord>> {
        let records = sqlx::query_as::<_, MaintenanceRecord>(
            r#"
            SELECT * FROM maintenance_records
            WHERE ($1::maintenance_status IS NULL OR status = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
