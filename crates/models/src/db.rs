use std::{env, time::Duration};

use configs::DatabaseConfig;
use anyhow::Context;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use tracing::info;

use crate::errors::ModelError;

/// Connect using `DATABASE_URL` from the environment (`.env` honoured).
pub async fn connect() -> anyhow::Result<DatabaseConnection> {
    let _ = dotenvy::dotenv();
    let url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
    let db = Database::connect(url).await?;
    Ok(db)
}

/// Build pool options from the `[database]` config section.
pub fn connect_options(cfg: &DatabaseConfig) -> ConnectOptions {
    let mut opt = ConnectOptions::new(cfg.url.clone());
    opt.max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(cfg.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(cfg.max_lifetime_secs))
        .sqlx_logging(cfg.sqlx_logging);
    opt
}

pub async fn connect_with_config(cfg: &DatabaseConfig) -> Result<DatabaseConnection, ModelError> {
    let db = Database::connect(connect_options(cfg)).await?;
    info!(max_connections = cfg.max_connections, min_connections = cfg.min_connections, "database pool ready");
    Ok(db)
}

/// Round-trip a trivial statement to verify the pool is usable.
pub async fn ping(db: &DatabaseConnection) -> Result<(), ModelError> {
    db.execute_unprepared("SELECT 1").await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_options_use_the_configured_url_only() {
        let cfg = DatabaseConfig { url: "postgres://catalog@db:5432/catalog".into(), ..DatabaseConfig::default() };
        let opt = connect_options(&cfg);
        assert_eq!(opt.get_url(), "postgres://catalog@db:5432/catalog");
        assert_eq!(opt.get_max_connections(), Some(cfg.max_connections));
    }
}
