use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::lease::LeaseStatus;

// Request para crear un alquiler
#[derive(Debug, Deserialize)]
pub struct CreateLeaseRequest {
    pub spot_id: Uuid,
    pub months: i32,
    pub rate: Decimal,
}

#[derive(Debug, Default, Deserialize)]
pub struct LeaseListQuery {
    pub status: Option<LeaseStatus>,
}
