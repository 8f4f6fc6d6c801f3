//! Services module
//!
//! Este módulo contiene la lógica de negocio de la aplicación.
//! Los servicios aplican las reglas y delegan la persistencia en los repositorios.

pub mod auth_service;
pub mod lease_service;
pub mod owner_service;
pub mod parking_service;
pub mod report_service;
pub mod vehicle_service;

pub use auth_service::AuthService;
pub use lease_service::LeaseService;
pub use owner_service::OwnerService;
pub use parking_service::ParkingService;
pub use report_service::ReportService;
pub use vehicle_service::VehicleService;
