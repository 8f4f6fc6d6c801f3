//! Servicio de alquileres
//!
//! Crear un alquiler extiende `expires_at` de la plaza; el barrido diario
//! marca como expirados los que vencen en las próximas 24 horas.

use chrono::{DateTime, Duration, Months, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::lease::{LeaseOrder, LeaseStatus, NewLease};
use crate::repositories::LeaseRepository;
use crate::utils::errors::{AppError, AppResult};

/// Ventana del barrido de expiraciones
pub const EXPIRATION_LOOKAHEAD_HOURS: i64 = 24;

pub struct LeaseService {
    leases: Arc<dyn LeaseRepository>,
}

impl LeaseService {
    pub fn new(leases: Arc<dyn LeaseRepository>) -> Self {
        Self { leases }
    }

    /// `total = rate * months`, `end = start + months` en meses de calendario
    pub async fn create_lease(
        &self,
        user_id: Uuid,
        spot_id: Uuid,
        months: i32,
        rate: Decimal,
    ) -> AppResult<LeaseOrder> {
        if months <= 0 {
            return Err(AppError::InvalidInput(
                "months must be greater than zero".to_string(),
            ));
        }
        if rate <= Decimal::ZERO {
            return Err(AppError::InvalidInput(
                "rate must be greater than zero".to_string(),
            ));
        }

        let start_date = Utc::now();
        let end_date = start_date
            .checked_add_months(Months::new(months as u32))
            .ok_or_else(|| AppError::InvalidInput("lease end date out of range".to_string()))?;

        let lease = self
            .leases
            .create_lease_with_expiry(NewLease {
                user_id,
                spot_id,
                start_date,
                end_date,
                total_price: rate * Decimal::from(months),
            })
            .await?;

        tracing::info!(
            lease_id = %lease.id,
            user_id = %user_id,
            spot_id = %spot_id,
            months,
            total = %lease.total_price,
            "📝 Alquiler creado"
        );
        Ok(lease)
    }

    pub async fn list_user_leases(
        &self,
        user_id: Uuid,
        status: Option<LeaseStatus>,
    ) -> AppResult<Vec<LeaseOrder>> {
        self.leases.list_by_user(user_id, status).await
    }

    /// Barrido diario de expiraciones. Devuelve cuántos alquileres expiró.
    pub async fn check_lease_expirations(&self) -> AppResult<usize> {
        self.check_lease_expirations_at(Utc::now()).await
    }

    /// Un fallo en un alquiler se registra y no detiene el resto
    pub async fn check_lease_expirations_at(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let horizon = now + Duration::hours(EXPIRATION_LOOKAHEAD_HOURS);
        let expiring = self.leases.find_expiring(horizon).await?;

        let mut expired = 0;
        for lease in expiring {
            match self.leases.expire_lease(lease.id).await {
                Ok(()) => {
                    expired += 1;
                    tracing::info!(lease_id = %lease.id, spot_id = %lease.spot_id, "⌛ Alquiler expirado");
                }
                Err(e) => {
                    tracing::error!(lease_id = %lease.id, error = %e, "❌ Error expirando alquiler");
                }
            }
        }
        Ok(expired)
    }
}
