//! Servicio de aparcamiento: máquina de estados de ocupación
//!
//! `idle -> occupied -> idle` en el camino normal y `* -> faulty -> idle`
//! cuando un operador reporta una avería. Una plaza ocupada tiene siempre
//! exactamente un registro abierto.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::parking::{
    NewParkingSpot, OccupyRequest, ParkingRecord, ParkingSpot, ParkingStatus, ParkingType,
    SpotFilter,
};
use crate::models::report::{MaintenanceRecord, MaintenanceStatus};
use crate::models::user::User;
use crate::repositories::{ParkingRepository, StatusChange, UserRepository, VehicleRepository};
use crate::utils::errors::{forbidden_error, not_found_error, AppError, AppResult};
use crate::utils::validation::normalize_license;

/// Tiempo tras el cual una plaza averiada vuelve sola a `idle`
pub const FAULTY_RESET_AFTER_HOURS: i64 = 24;

/// Tarifa horaria por defecto de las plazas temporales
pub fn default_temporary_hourly_rate() -> Decimal {
    Decimal::new(5, 0)
}

/// Tarifa mensual por defecto de las plazas de alquiler corto
pub fn default_short_term_monthly_rate() -> Decimal {
    Decimal::new(300, 0)
}

/// Importe de una estancia cerrada.
///
/// Se calcula con la hora de salida del registro, así que repetir el cálculo
/// da siempre el mismo resultado. Sin hora de salida el importe es cero.
pub fn calculate_fee(record: &ParkingRecord, spot: &ParkingSpot) -> Decimal {
    let Some(exit_time) = record.exit_time else {
        return Decimal::ZERO;
    };

    let chargeable = match spot.spot_type {
        ParkingType::Temporary => true,
        // Solo se cobra si el alquiler ya había vencido
        ParkingType::ShortTerm => spot.expires_at.map_or(false, |expiry| exit_time > expiry),
        ParkingType::Permanent => false,
    };
    if !chargeable {
        return Decimal::ZERO;
    }

    let seconds = (exit_time - record.entry_time).num_seconds().max(0);
    let hours = Decimal::from(seconds) / Decimal::from(3600);
    (hours * spot.hourly_rate).round_dp(2)
}

pub struct ParkingService {
    parking: Arc<dyn ParkingRepository>,
    vehicles: Arc<dyn VehicleRepository>,
    users: Arc<dyn UserRepository>,
}

impl ParkingService {
    pub fn new(
        parking: Arc<dyn ParkingRepository>,
        vehicles: Arc<dyn VehicleRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            parking,
            vehicles,
            users,
        }
    }

    /// Entrada de un vehículo en una plaza temporal libre
    pub async fn process_entry(
        &self,
        license: &str,
        user_id: Option<Uuid>,
    ) -> AppResult<ParkingRecord> {
        let license = normalize_license(license);
        self.ensure_no_open_record(&license).await?;

        let candidates = self
            .parking
            .list_spots(&SpotFilter {
                spot_type: Some(ParkingType::Temporary),
                status: Some(ParkingStatus::Idle),
                ..Default::default()
            })
            .await?;

        self.occupy_first(candidates, license, user_id).await
    }

    /// Entrada de un propietario en una de sus propias plazas
    pub async fn process_owner_entry(
        &self,
        user_id: Uuid,
        license: &str,
    ) -> AppResult<ParkingRecord> {
        let license = normalize_license(license);
        self.ensure_no_open_record(&license).await?;

        let candidates = self
            .parking
            .list_spots(&SpotFilter {
                status: Some(ParkingStatus::Idle),
                owner_id: Some(user_id),
                ..Default::default()
            })
            .await?;

        self.occupy_first(candidates, license, Some(user_id)).await
    }

    async fn ensure_no_open_record(&self, license: &str) -> AppResult<()> {
        if self
            .parking
            .find_open_record_by_license(license)
            .await?
            .is_some()
        {
            return Err(AppError::RecordAlreadyOpen(license.to_string()));
        }
        Ok(())
    }

    /// Intenta ocupar las plazas en orden; si otra entrada gana una, pasa a la siguiente
    async fn occupy_first(
        &self,
        candidates: Vec<ParkingSpot>,
        license: String,
        user_id: Option<Uuid>,
    ) -> AppResult<ParkingRecord> {
        let vehicle_id = self
            .vehicles
            .find_by_license(&license)
            .await?
            .map(|vehicle| vehicle.id);

        for spot in candidates {
            let request = OccupyRequest {
                spot_id: spot.id,
                license: license.clone(),
                user_id,
                vehicle_id,
            };
            match self.parking.occupy_spot(request).await {
                Ok(record) => {
                    tracing::info!(
                        record_id = %record.id,
                        spot_id = %record.spot_id,
                        license = %record.license,
                        "🚗 Entrada registrada"
                    );
                    return Ok(record);
                }
                Err(AppError::SpotUnavailable(spot_id)) => {
                    tracing::debug!(spot_id = %spot_id, "🔁 Plaza ocupada por otra entrada, probando la siguiente");
                }
                Err(e) => return Err(e),
            }
        }

        tracing::warn!(license = %license, "⚠️ Sin plazas libres");
        Err(AppError::NoAvailableSpot)
    }

    /// Salida: cierra el registro, libera la plaza y calcula el importe
    pub async fn process_exit(&self, record_id: Uuid) -> AppResult<ParkingRecord> {
        let mut record = self.parking.release_spot(record_id).await?;

        let spot = self
            .parking
            .find_spot(record.spot_id)
            .await?
            .ok_or_else(|| not_found_error("Parking spot", &record.spot_id))?;

        let fee = calculate_fee(&record, &spot);
        self.parking.set_record_cost(record.id, fee).await?;
        record.total_cost = fee;

        tracing::info!(
            record_id = %record.id,
            spot_id = %spot.id,
            fee = %fee,
            "🏁 Salida registrada"
        );
        Ok(record)
    }

    /// Alta de plaza; las tarifas a cero toman el valor por defecto de su tipo
    pub async fn create_spot(
        &self,
        spot_type: ParkingType,
        hourly_rate: Option<Decimal>,
        monthly_rate: Option<Decimal>,
        notes: Option<String>,
    ) -> AppResult<ParkingSpot> {
        let mut hourly_rate = hourly_rate.unwrap_or(Decimal::ZERO);
        let mut monthly_rate = monthly_rate.unwrap_or(Decimal::ZERO);
        if hourly_rate < Decimal::ZERO || monthly_rate < Decimal::ZERO {
            return Err(AppError::InvalidInput(
                "rates must not be negative".to_string(),
            ));
        }

        if spot_type == ParkingType::Temporary && hourly_rate.is_zero() {
            hourly_rate = default_temporary_hourly_rate();
        }
        if spot_type == ParkingType::ShortTerm && monthly_rate.is_zero() {
            monthly_rate = default_short_term_monthly_rate();
        }

        let spot = self
            .parking
            .create_spot(NewParkingSpot {
                spot_type,
                hourly_rate,
                monthly_rate,
                notes,
            })
            .await?;

        tracing::info!(spot_id = %spot.id, spot_type = %spot.spot_type, "🅿️ Plaza creada");
        Ok(spot)
    }

    pub async fn list_spots(&self, filter: &SpotFilter) -> AppResult<Vec<ParkingSpot>> {
        self.parking.list_spots(filter).await
    }

    pub async fn get_user_spots(&self, user_id: Uuid) -> AppResult<Vec<ParkingSpot>> {
        self.parking
            .list_spots(&SpotFilter {
                owner_id: Some(user_id),
                ..Default::default()
            })
            .await
    }

    pub async fn get_spot(&self, spot_id: Uuid) -> AppResult<ParkingSpot> {
        self.parking
            .find_spot(spot_id)
            .await?
            .ok_or_else(|| not_found_error("Parking spot", &spot_id))
    }

    /// Solo el usuario del registro o un administrador pueden verlo
    pub async fn get_record(
        &self,
        record_id: Uuid,
        caller_id: Uuid,
        caller_is_admin: bool,
    ) -> AppResult<ParkingRecord> {
        let record = self
            .parking
            .find_record(record_id)
            .await?
            .ok_or_else(|| not_found_error("Parking record", &record_id))?;

        if !caller_is_admin && record.user_id != Some(caller_id) {
            return Err(forbidden_error("view record", "record belongs to another user"));
        }
        Ok(record)
    }

    /// Sobrescribe estado y notas de la plaza sin validar la transición
    pub async fn update_spot_status(
        &self,
        spot_id: Uuid,
        status: ParkingStatus,
        notes: Option<String>,
        reported_by: Option<Uuid>,
    ) -> AppResult<ParkingSpot> {
        let current = self.get_spot(spot_id).await?;
        let open_record = self.parking.find_open_record_by_spot(spot_id).await?;

        let contradicts_occupancy = match status {
            ParkingStatus::Occupied => open_record.is_none(),
            ParkingStatus::Idle | ParkingStatus::Faulty => open_record.is_some(),
        };
        if contradicts_occupancy {
            tracing::warn!(
                spot_id = %spot_id,
                from = %current.status,
                to = %status,
                open_record = ?open_record.as_ref().map(|r| r.id),
                "⚠️ Cambio de estado incoherente con los registros abiertos"
            );
        }

        let spot = self
            .parking
            .update_spot_status(StatusChange {
                spot_id,
                status,
                notes,
                reported_by,
            })
            .await?;

        tracing::info!(spot_id = %spot_id, from = %current.status, to = %status, "🔧 Estado de plaza actualizado");
        Ok(spot)
    }

    /// Devuelve a `idle` las plazas averiadas desde hace más de 24 horas
    pub async fn check_faulty_spots(&self) -> AppResult<usize> {
        self.check_faulty_spots_at(Utc::now()).await
    }

    pub async fn check_faulty_spots_at(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let cutoff = now - Duration::hours(FAULTY_RESET_AFTER_HOURS);
        let reset = self.parking.reset_faulty_spots(cutoff).await?;

        for spot_id in &reset {
            tracing::info!(spot_id = %spot_id, "🔧 Plaza averiada restablecida a idle");
        }
        Ok(reset.len())
    }

    pub async fn bind_parking_to_user(&self, spot_id: Uuid, user_id: Uuid) -> AppResult<ParkingSpot> {
        let spot = self.parking.bind_owner(spot_id, user_id).await?;
        tracing::info!(spot_id = %spot_id, user_id = %user_id, "🔗 Plaza vinculada a usuario");
        Ok(spot)
    }

    pub async fn unbind_parking(&self, spot_id: Uuid, user_id: Uuid) -> AppResult<ParkingSpot> {
        let spot = self.parking.unbind_owner(spot_id, user_id).await?;
        tracing::info!(spot_id = %spot_id, user_id = %user_id, "✂️ Plaza desvinculada");
        Ok(spot)
    }

    /// Propietario actual de la plaza, si tiene
    pub async fn get_bound_user(&self, spot_id: Uuid) -> AppResult<(ParkingSpot, Option<User>)> {
        let spot = self.get_spot(spot_id).await?;
        let owner = match spot.owner_id {
            Some(owner_id) => self.users.find_by_id(owner_id).await?,
            None => None,
        };
        Ok((spot, owner))
    }

    pub async fn list_maintenance(
        &self,
        status: Option<MaintenanceStatus>,
    ) -> AppResult<Vec<MaintenanceRecord>> {
        self.parking.list_maintenance(status).await
    }
}
