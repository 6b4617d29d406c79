use std::future::Future;

use configs::{AppConfig, DatabaseConfig};
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;

/// Open the pool, verify it and apply pending migrations when enabled.
pub async fn prepare_database(cfg: &DatabaseConfig) -> Result<DatabaseConnection, StartupError> {
    let db = models::db::connect_with_config(cfg)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    models::db::ping(&db).await.map_err(|e| StartupError::Database(e.to_string()))?;
    if cfg.auto_migrate {
        migration::Migrator::up(&db, None)
            .await
            .map_err(|e| StartupError::Database(format!("migrate up: {e}")))?;
        info!("migrations applied");
    }
    Ok(db)
}

/// Serve the router on an already bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = routes::build_router(state);
    let addr = listener.local_addr()?;
    info!(%addr, "catalog api listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl+C; running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

/// Public entry: load config, prepare the database and run the HTTP server.
/// Expects `.env` and logging to be set up by the caller.
pub async fn run() -> anyhow::Result<()> {
    let cfg = AppConfig::load_or_env().map_err(|e| StartupError::InvalidConfig(format!("{e:#}")))?;
    let db = prepare_database(&cfg.database).await?;

    let listener = TcpListener::bind(cfg.server.bind_addr()).await?;
    serve(listener, AppState::with_db(db), shutdown_signal()).await
}
