use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::parking::ParkingType;

// Request de entrada de un vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct EntryRequest {
    #[validate(custom = "crate::utils::validation::validate_license_plate")]
    pub license: String,
}

// Request para dar de alta una plaza
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSpotRequest {
    #[serde(rename = "type")]
    pub spot_type: ParkingType,
    #[validate(custom = "crate::utils::validation::validate_non_negative_amount")]
    pub hourly_rate: Option<Decimal>,
    #[validate(custom = "crate::utils::validation::validate_non_negative_amount")]
    pub monthly_rate: Option<Decimal>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

// Request para publicar una plaza en alquiler (meses)
#[derive(Debug, Deserialize)]
pub struct RentRequest {
    pub spot_id: Uuid,
    pub rate: Decimal,
    pub months: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_spot_request_uses_type_field() {
        let request: CreateSpotRequest =
            serde_json::from_str(r#"{"type":"temporary","hourly_rate":"2.5"}"#).unwrap();
        assert_eq!(request.spot_type, ParkingType::Temporary);
        assert_eq!(request.hourly_rate, Some(Decimal::new(25, 1)));
        assert!(request.validate().is_ok());

        assert!(serde_json::from_str::<CreateSpotRequest>(r#"{"type":"vip"}"#).is_err());
    }

    #[test]
    fn test_negative_rate_fails_validation() {
        let request = CreateSpotRequest {
            spot_type: ParkingType::Temporary,
            hourly_rate: Some(Decimal::new(-5, 0)),
            monthly_rate: None,
            notes: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_entry_request_validates_plate() {
        assert!(EntryRequest { license: "AB-123".into() }.validate().is_ok());
        assert!(EntryRequest { license: "!".into() }.validate().is_err());
    }
}
