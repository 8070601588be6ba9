use std::{str::FromStr, time::Duration};

use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

use crate::errors::AppError;

/// Opens (creating if needed) the SQLite database at `database_url` and applies migrations.
pub async fn connect(database_url: &str) -> Result<SqlitePool, AppError> {
    let opts = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .read_only(false)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePool::connect_with(opts).await.map_err(|e| {
        log::error!("Failed to open database {}: {}", database_url, e);
        AppError::DatabaseError(e)
    })?;

    migrate(&pool).await?;
    log::info!("Database {} ready", database_url);
    Ok(pool)
}

/// A private in-memory database. Every pooled connection to `:memory:` would be
/// a separate database, so the pool holds exactly one connection that never expires.
pub async fn connect_in_memory() -> Result<SqlitePool, AppError> {
    let opts = SqliteConnectOptions::from_str("sqlite::memory:")?;
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(opts)
        .await?;

    migrate(&pool).await?;
    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::migrate!().run(pool).await.map_err(|e| {
        log::error!("Migration failed: {}", e);
        AppError::MigrationError(e)
    })?;
    log::debug!("Database migrated successfully");
    Ok(())
}
