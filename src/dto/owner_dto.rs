use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

// Request de compra de plaza permanente
#[derive(Debug, Deserialize, Validate)]
pub struct PurchaseRequest {
    pub spot_id: Uuid,
    #[validate(custom = "crate::utils::validation::validate_positive_amount")]
    pub price: Decimal,
}
