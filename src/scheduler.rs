//! Tareas programadas
//!
//! - Diaria (01:00 UTC): expira alquileres y registra el informe del día.
//! - Cada hora: restablece plazas averiadas hace más de 24 horas.

use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::state::AppState;
use crate::utils::errors::AppResult;

pub const DAILY_CRON: &str = "0 0 1 * * *";
pub const HOURLY_CRON: &str = "0 0 * * * *";

/// Registra las tareas y arranca el planificador
pub async fn start_scheduler(state: AppState) -> Result<JobScheduler> {
    let sched = JobScheduler::new().await?;

    let daily_state = state.clone();
    sched
        .add(Job::new_async(DAILY_CRON, move |_, _| {
            let state = daily_state.clone();
            Box::pin(async move {
                if let Err(e) = run_daily_jobs(&state).await {
                    tracing::error!(error = %e, "❌ Error en la tarea diaria");
                }
            })
        })?)
        .await?;

    let hourly_state = state;
    sched
        .add(Job::new_async(HOURLY_CRON, move |_, _| {
            let state = hourly_state.clone();
            Box::pin(async move {
                if let Err(e) = run_hourly_jobs(&state).await {
                    tracing::error!(error = %e, "❌ Error en la tarea horaria");
                }
            })
        })?)
        .await?;

    sched.start().await?;
    tracing::info!(daily = DAILY_CRON, hourly = HOURLY_CRON, "⏰ Planificador iniciado");

    Ok(sched)
}

/// Expira alquileres y deja el informe de ingresos en los logs.
/// Devuelve cuántos alquileres expiraron.
pub async fn run_daily_jobs(state: &AppState) -> AppResult<usize> {
    let expired = state.lease_service.check_lease_expirations().await?;
    tracing::info!(expired, "⌛ Barrido de alquileres completado");

    match state.report_service.generate_daily_report(1).await {
        Ok(report) => tracing::info!(
            total_income = %report.total_income,
            temporary = report.temporary_count,
            short_term = report.short_term_count,
            permanent = report.permanent_count,
            "📊 Informe diario generado"
        ),
        Err(e) => tracing::error!(error = %e, "❌ Error generando el informe diario"),
    }

    Ok(expired)
}

pub async fn run_hourly_jobs(state: &AppState) -> AppResult<usize> {
    let reset = state.parking_service.check_faulty_spots().await?;
    if reset > 0 {
        tracing::info!(reset, "🔧 Plazas averiadas restablecidas");
    }
    Ok(reset)
}
