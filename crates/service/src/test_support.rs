#![cfg(test)]
use configs::DatabaseConfig;
use migration::MigratorTrait;
use models::db::connect_with_config;
use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;

// Migrations run once per test process
static MIGRATED: OnceCell<()> = OnceCell::const_new();

fn test_config() -> Option<DatabaseConfig> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    let url = std::env::var("DATABASE_URL").ok()?;
    Some(DatabaseConfig { url, max_connections: 5, min_connections: 1, acquire_timeout_secs: 10, ..DatabaseConfig::default() })
}

/// A migrated connection, or `None` when no test database is configured.
pub async fn get_db() -> Result<Option<DatabaseConnection>, anyhow::Error> {
    let Some(cfg) = test_config() else {
        eprintln!("skip: DATABASE_URL missing or SKIP_DB_TESTS set");
        return Ok(None);
    };
    let db = connect_with_config(&cfg).await?;
    MIGRATED
        .get_or_try_init(|| async { migration::Migrator::up(&db, None).await })
        .await?;
    Ok(Some(db))
}
