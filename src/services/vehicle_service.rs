//! Servicio de vehículos
//!
//! Alta y baja de vehículos del usuario y publicación de plazas en alquiler.

use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::lease::LeaseOrder;
use crate::models::vehicle::{NewVehicle, Vehicle};
use crate::repositories::{ParkingRepository, VehicleRepository};
use crate::services::lease_service::LeaseService;
use crate::utils::errors::{forbidden_error, not_found_error, AppError, AppResult};
use crate::utils::validation::normalize_license;

pub struct VehicleService {
    vehicles: Arc<dyn VehicleRepository>,
    parking: Arc<dyn ParkingRepository>,
    leases: Arc<LeaseService>,
}

impl VehicleService {
    pub fn new(
        vehicles: Arc<dyn VehicleRepository>,
        parking: Arc<dyn ParkingRepository>,
        leases: Arc<LeaseService>,
    ) -> Self {
        Self {
            vehicles,
            parking,
            leases,
        }
    }

    pub async fn bind_vehicle(
        &self,
        user_id: Uuid,
        license_plate: &str,
        brand: Option<String>,
        model: Option<String>,
    ) -> AppResult<Vehicle> {
        let vehicle = self
            .vehicles
            .add_vehicle(NewVehicle {
                user_id,
                license_plate: normalize_license(license_plate),
                brand,
                model,
            })
            .await?;

        tracing::info!(
            user_id = %user_id,
            vehicle_id = %vehicle.id,
            is_default = vehicle.is_default,
            "🚙 Vehículo registrado"
        );
        Ok(vehicle)
    }

    pub async fn remove_vehicle(&self, user_id: Uuid, vehicle_id: Uuid) -> AppResult<()> {
        self.vehicles.remove_vehicle(user_id, vehicle_id).await?;
        tracing::info!(user_id = %user_id, vehicle_id = %vehicle_id, "🗑️ Vehículo eliminado");
        Ok(())
    }

    pub async fn list_vehicles(&self, user_id: Uuid) -> AppResult<Vec<Vehicle>> {
        self.vehicles.list_by_user(user_id).await
    }

    /// El propietario publica su plaza en alquiler; `months` se pasa tal cual al alquiler
    pub async fn publish_spot_for_rent(
        &self,
        user_id: Uuid,
        spot_id: Uuid,
        rate: Decimal,
        months: i32,
    ) -> AppResult<LeaseOrder> {
        let spot = self
            .parking
            .find_spot(spot_id)
            .await?
            .ok_or_else(|| not_found_error("Parking spot", &spot_id))?;

        match spot.owner_id {
            None => return Err(AppError::NoOwner(spot_id)),
            Some(owner_id) if owner_id != user_id => {
                return Err(forbidden_error("rent spot", "caller is not the owner"));
            }
            Some(_) => {}
        }

        self.leases
            .create_lease(user_id, spot_id, months, rate)
            .await
    }
}
