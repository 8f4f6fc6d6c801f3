use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};

use parking_manager::config::environment::EnvironmentConfig;
use parking_manager::database::{create_pool, run_migrations};
use parking_manager::logging::init_tracing;
use parking_manager::routes::create_app_router;
use parking_manager::scheduler::start_scheduler;
use parking_manager::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = EnvironmentConfig::load()?;
    init_tracing(&config.logging)?;

    info!("🅿️ Parking Manager - API REST");
    info!("🌍 Entorno: {}", config.environment);

    let pool = create_pool(&config.database).await?;
    run_migrations(&pool).await?;

    let addr = config.server_url();
    let state = AppState::new(pool, config);

    if let Some((username, password, email)) = state.config.admin.credentials() {
        match state.auth_service.ensure_admin(username, password, email).await {
            Ok(true) => info!(username, "👑 Administrador inicial preparado"),
            Ok(false) => info!(username, "👑 El administrador ya existe"),
            Err(e) => error!("❌ Error preparando el administrador: {}", e),
        }
    } else {
        warn!("⚠️ ADMIN_USERNAME/ADMIN_PASSWORD/ADMIN_EMAIL no definidos, sin administrador inicial");
    }

    let mut scheduler = start_scheduler(state.clone()).await?;
    let app = create_app_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🌐 Servidor iniciando en http://{}", addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
    }

    if let Err(e) = scheduler.shutdown().await {
        warn!("⚠️ Error deteniendo el planificador: {}", e);
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo escuchar Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el manejador de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
