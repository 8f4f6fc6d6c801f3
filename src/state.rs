//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum. Se construye una vez al arrancar; no hay
//! estado global.

use sqlx::PgPool;
use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::Repositories;
use crate::services::{
    AuthService, LeaseService, OwnerService, ParkingService, ReportService, VehicleService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EnvironmentConfig>,
    pub auth_service: Arc<AuthService>,
    pub parking_service: Arc<ParkingService>,
    pub lease_service: Arc<LeaseService>,
    pub owner_service: Arc<OwnerService>,
    pub vehicle_service: Arc<VehicleService>,
    pub report_service: Arc<ReportService>,
}

impl AppState {
    pub fn new(pool: PgPool, config: EnvironmentConfig) -> Self {
        Self::from_repositories(config, Repositories::postgres(pool))
    }

    /// Construye los servicios sobre cualquier conjunto de repositorios
    pub fn from_repositories(config: EnvironmentConfig, repos: Repositories) -> Self {
        let lease_service = Arc::new(LeaseService::new(repos.leases.clone()));

        Self {
            auth_service: Arc::new(AuthService::new(
                repos.users.clone(),
                config.jwt.clone(),
                config.bcrypt_cost,
            )),
            parking_service: Arc::new(ParkingService::new(
                repos.parking.clone(),
                repos.vehicles.clone(),
                repos.users.clone(),
            )),
            owner_service: Arc::new(OwnerService::new(repos.purchases.clone())),
            vehicle_service: Arc::new(VehicleService::new(
                repos.vehicles.clone(),
                repos.parking.clone(),
                lease_service.clone(),
            )),
            report_service: Arc::new(ReportService::new(repos.reports.clone())),
            lease_service,
            config: Arc::new(config),
        }
    }
}
