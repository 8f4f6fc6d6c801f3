//! Utilidades de validación
//!
//! Validadores personalizados usados por los DTOs con `#[validate(custom = ...)]`.

use rust_decimal::Decimal;
use validator::ValidationError;

/// Longitud máxima de una matrícula normalizada
pub const MAX_LICENSE_LEN: usize = 12;

/// Validar formato de matrícula de vehículo
///
/// Se valida la forma normalizada, que es la que llega a la base de datos.
pub fn validate_license_plate(value: &str) -> Result<(), ValidationError> {
    let clean_plate = normalize_license(value);
    let valid_chars = clean_plate.chars().all(|c| c.is_alphanumeric());
    let len = clean_plate.chars().count();
    if !valid_chars || !(2..=MAX_LICENSE_LEN).contains(&len) {
        let mut error = ValidationError::new("license_plate");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que un importe sea estrictamente positivo
pub fn validate_positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        let mut error = ValidationError::new("positive");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que un importe no sea negativo
pub fn validate_non_negative_amount(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        let mut error = ValidationError::new("non_negative");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Normaliza la matrícula: sin separadores (espacio, guion, guion bajo) y en mayúsculas
pub fn normalize_license(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .to_uppercase()
}
