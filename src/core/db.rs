//! Database bootstrap - pool creation and embedded migrations

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, instrument};

/// Opens the pool and applies the embedded migrations.
///
/// Any failure here is fatal for the caller: the service must not start with
/// an unreachable or unmigrated store.
#[instrument(skip(database_url))]
pub async fn connect(
    database_url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let mut pool_options = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout);

    // every connection to ":memory:" is a distinct database: keep exactly one alive
    if database_url.contains(":memory:") {
        pool_options = pool_options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    let pool = pool_options.connect_with(options).await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Message store ready");

    Ok(pool)
}

/// Private in-memory store, used by tests and local experiments.
pub async fn connect_in_memory() -> Result<SqlitePool, sqlx::Error> {
    connect("sqlite::memory:", 1, Duration::from_secs(5)).await
}
