//! Repositorios: acceso a PostgreSQL detrás de traits
//!
//! Los servicios solo ven `Arc<dyn XRepository>`; las implementaciones `Pg*`
//! hablan con la base de datos.

pub mod lease_repository;
pub mod parking_repository;
pub mod purchase_repository;
pub mod report_repository;
pub mod user_repository;
pub mod vehicle_repository;

#[cfg(test)]
pub mod memory;

use sqlx::PgPool;
use std::sync::Arc;

pub use lease_repository::{LeaseRepository, PgLeaseRepository};
pub use parking_repository::{ParkingRepository, PgParkingRepository, StatusChange};
pub use purchase_repository::{PgPurchaseRepository, PurchaseRepository};
pub use report_repository::{PgReportRepository, ReportRepository};
pub use user_repository::{PgUserRepository, UserRepository};
pub use vehicle_repository::{PgVehicleRepository, VehicleRepository};

/// Conjunto de repositorios con el que se construye el estado de la aplicación
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub parking: Arc<dyn ParkingRepository>,
    pub leases: Arc<dyn LeaseRepository>,
    pub vehicles: Arc<dyn VehicleRepository>,
    pub purchases: Arc<dyn PurchaseRepository>,
    pub reports: Arc<dyn ReportRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            parking: Arc::new(PgParkingRepository::new(pool.clone())),
            leases: Arc::new(PgLeaseRepository::new(pool.clone())),
            vehicles: Arc::new(PgVehicleRepository::new(pool.clone())),
            purchases: Arc::new(PgPurchaseRepository::new(pool.clone())),
            reports: Arc::new(PgReportRepository::new(pool)),
        }
    }
}
