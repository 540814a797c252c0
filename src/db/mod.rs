//! Database initialization and migration runner.
//!
//! SYSTEM CONTEXT
//! ==============
//! Startup uses this module to open the `SQLite` preferences database and
//! apply schema migrations before the service accepts traffic.

pub mod store;

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use crate::config::env_parse;

const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

/// Initialize the `SQLite` connection pool and run migrations.
///
/// Pool size comes from `DB_MAX_CONNECTIONS` (default 5).
///
/// # Errors
///
/// Returns an error if the connection or migrations fail.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    init_pool_with(database_url, env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)).await
}

/// Same as [`init_pool`] with an explicit pool size. In-memory databases
/// need exactly one connection to be shared.
///
/// # Errors
///
/// Returns an error if the connection or migrations fail.
pub async fn init_pool_with(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect(database_url)
        .await?;

    sqlx::migrate!("src/db/migrations").run(&pool).await?;

    Ok(pool)
}
