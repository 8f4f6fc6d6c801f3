use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::run_in_transaction;
use crate::models::vehicle::{NewVehicle, Vehicle};
use crate::utils::errors::{is_unique_violation_on, AppError, AppResult};

const LICENSE_PLATE_INDEX: &str = "idx_vehicles_license_plate";

/// Bloquea la fila del usuario: serializa la asignación del vehículo por defecto
async fn lock_user(conn: &mut sqlx::PgConnection, user_id: Uuid) -> AppResult<()> {
    sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(())
}

#[async_trait]
pub trait VehicleRepository: Send + Sync {
    /// Registra el vehículo; el primero de cada usuario queda por defecto
    async fn add_vehicle(&self, vehicle: NewVehicle) -> AppResult<Vehicle>;

    /// Borra el vehículo del usuario y, si era el de por defecto, promueve el más antiguo
    async fn remove_vehicle(&self, user_id: Uuid, vehicle_id: Uuid) -> AppResult<()>;

    /// Vehículos del usuario: primero el de por defecto, después los más recientes
    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Vehicle>>;

    async fn find_by_license(&self, license_plate: &str) -> AppResult<Option<Vehicle>>;
}

pub struct PgVehicleRepository {
    pool: PgPool,
}

impl PgVehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VehicleRepository for PgVehicleRepository {
    async fn add_vehicle(&self, vehicle: NewVehicle) -> AppResult<Vehicle> {
        let plate = vehicle.license_plate.clone();

        let result = run_in_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                lock_user(&mut **tx, vehicle.user_id).await?;

                let (taken,): (bool,) = sqlx::query_as(
                    "SELECT EXISTS(SELECT 1 FROM vehicles WHERE license_plate = $1)",
                )
                .bind(&vehicle.license_plate)
                .fetch_one(&mut **tx)
                .await?;
                if taken {
                    return Err(AppError::DuplicateLicense(vehicle.license_plate));
                }

                let (count,): (i64,) =
                    sqlx::query_as("SELECT COUNT(*) FROM vehicles WHERE user_id = $1")
                        .bind(vehicle.user_id)
                        .fetch_one(&mut **tx)
                        .await?;

                let created = sqlx::query_as::<_, Vehicle>(
                    r#"
                    INSERT INTO vehicles (id, user_id, license_plate, brand, model, is_default, created_at)
                    VALUES ($1, $2, $3, $4, $5, $6, NOW())
                    RETURNING *
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(vehicle.user_id)
                .bind(&vehicle.license_plate)
                .bind(&vehicle.brand)
                .bind(&vehicle.model)
                .bind(count == 0)
                .fetch_one(&mut **tx)
                .await?;

                Ok(created)
            })
        })
        .await;

        match result {
            Err(AppError::Database(e)) if is_unique_violation_on(&e, LICENSE_PLATE_INDEX) => {
                Err(AppError::DuplicateLicense(plate))
            }
            other => other,
        }
    }

    async fn remove_vehicle(&self, user_id: Uuid, vehicle_id: Uuid) -> AppResult<()> {
        run_in_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                lock_user(&mut **tx, user_id).await?;

                let vehicle = sqlx::query_as::<_, Vehicle>(
                    "SELECT * FROM vehicles WHERE id = $1 AND user_id = $2 FOR UPDATE",
                )
                .bind(vehicle_id)
                .bind(user_id)
                .fetch_optional(&mut **tx)
                .await?
                .ok_or(AppError::NotFoundOrForbidden(vehicle_id))?;

                sqlx::query("DELETE FROM vehicles WHERE id = $1")
                    .bind(vehicle.id)
                    .execute(&mut **tx)
                    .await?;

                if vehicle.is_default {
                    sqlx::query(
                        r#"
                        UPDATE vehicles SET is_default = TRUE
                        WHERE id = (
                            SELECT id FROM vehicles
                            WHERE user_id = $1
                            ORDER BY created_at ASC, id ASC
                            LIMIT 1
                        )
                        "#,
                    )
                    .bind(user_id)
                    .execute(&mut **tx)
                    .await?;
                }

                Ok(())
            })
        })
        .await
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Vehicle>> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            "SELECT * FROM vehicles WHERE user_id = $1 ORDER BY is_default DESC, created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(vehicles)
    }

    async fn find_by_license(&self, license_plate: &str) -> AppResult<Option<Vehicle>> {
        let vehicle =
            sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE license_plate = $1")
                .bind(license_plate)
                .fetch_optional(&self.pool)
                .await?;

        Ok(vehicle)
    }
}
