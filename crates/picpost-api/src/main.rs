//! picpost-api server binary.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::info;

use picpost_api::{router, services::OrphanSweeper, telemetry, AppConfig, AppState};
use picpost_db::{Database, FilesystemBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    let _log_guard = telemetry::init_tracing(&config);

    let db = Database::connect_with_config(&config.database_url, config.pool_config())
        .await
        .context("Failed to connect to the catalog database")?;
    db.migrate().await?;
    info!(max_connections = config.db_max_connections, "Database ready");

    let blobs = FilesystemBackend::new(&config.upload_dir);
    blobs.validate().await.map_err(anyhow::Error::msg)?;
    info!(upload_dir = %config.upload_dir.display(), "Blob storage ready");

    let config = Arc::new(config);
    let catalog = Arc::new(db.images.clone());
    let blobs = Arc::new(blobs);

    if let Some(interval) = config.orphan_sweep_interval {
        OrphanSweeper::new(catalog.clone(), blobs.clone(), config.orphan_min_age)
            .spawn_periodic(interval);
    }

    let app = router(AppState::new(config.clone(), catalog, blobs));

    let addr: SocketAddr = config.bind_addr().parse()?;
    info!(
        app_name = %config.app_name,
        version = %config.app_version,
        prefix = %config.api_prefix,
        "Starting server on {}",
        addr
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
