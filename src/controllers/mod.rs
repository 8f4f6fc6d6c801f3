//! Controladores: validan la petición, llaman al servicio y dan forma a la respuesta

pub mod admin_controller;
pub mod auth_controller;
pub mod lease_controller;
pub mod owner_controller;
pub mod parking_controller;
pub mod report_controller;
pub mod vehicle_controller;
