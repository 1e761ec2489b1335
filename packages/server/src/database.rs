use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tracing::info;

use crate::config::DatabaseConfig;

/// Open the process-wide connection pool.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(config.url.clone());

    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout())
        .acquire_timeout(config.acquire_timeout())
        .sqlx_logging(config.sqlx_logging);
    if let Some(secs) = config.idle_timeout_secs {
        opt.idle_timeout(Duration::from_secs(secs));
    }
    if let Some(secs) = config.max_lifetime_secs {
        opt.max_lifetime(Duration::from_secs(secs));
    }

    Database::connect(opt).await
}

/// Create the `receipts` table if it does not exist yet.
///
/// Idempotent; run once at startup, never per request.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.get_schema_registry("receipt_server::entity::*")
        .sync(db)
        .await?;
    info!("Receipt schema is up to date");
    Ok(())
}

/// Connect and migrate.
pub async fn init_db(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let db = connect(config).await?;
    migrate(&db).await?;
    Ok(db)
}
