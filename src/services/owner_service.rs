use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::purchase::PurchaseRecord;
use crate::repositories::PurchaseRepository;
use crate::utils::errors::{AppError, AppResult};

/// Compra de plazas: una plaza temporal o de alquiler corto pasa a ser
/// permanente del comprador
pub struct OwnerService {
    purchases: Arc<dyn PurchaseRepository>,
}

impl OwnerService {
    pub fn new(purchases: Arc<dyn PurchaseRepository>) -> Self {
        Self { purchases }
    }

    pub async fn purchase_permanent_spot(
        &self,
        user_id: Uuid,
        spot_id: Uuid,
        price: Decimal,
    ) -> AppResult<PurchaseRecord> {
        if price <= Decimal::ZERO {
            return Err(AppError::InvalidInput(
                "price must be greater than zero".to_string(),
            ));
        }

        let record = self.purchases.purchase_spot(user_id, spot_id, price).await?;
        tracing::info!(
            user_id = %user_id,
            spot_id = %spot_id,
            price = %price,
            "🏠 Plaza comprada como permanente"
        );
        Ok(record)
    }

    pub async fn list_purchases(&self, user_id: Uuid) -> AppResult<Vec<PurchaseRecord>> {
        self.purchases.list_by_user(user_id).await
    }
}
