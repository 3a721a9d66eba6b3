pub mod models;
pub mod repository;

use crate::config::Config;
use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions, PgSslMode},
};
use std::str::FromStr;
use std::time::Duration;

/// Build the connection pool without opening any connections.
///
/// The pool is bounded by `database_max_connections`; a request that cannot
/// get a connection within `database_acquire_timeout_secs` fails instead of
/// waiting forever. Reachability is proven separately by [`health_check`]
/// before the server binds.
pub fn init_pool(config: &Config) -> anyhow::Result<PgPool> {
    let mut options =
        PgConnectOptions::from_str(&config.database_url).context("invalid DATABASE_URL")?;

    if config.database_tls_insecure {
        // Encrypted transport with CA validation skipped. Explicit opt-in
        // for managed providers that present self-signed chains.
        options = options.ssl_mode(PgSslMode::Require);
    }

    tracing::info!(
        host = options.get_host(),
        max_connections = config.database_max_connections,
        acquire_timeout_secs = config.database_acquire_timeout_secs,
        "Initializing database connection pool"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(config.database_acquire_timeout_secs))
        .connect_lazy_with(options);

    Ok(pool)
}

/// One round-trip `SELECT 1` proving the database is reachable.
///
/// Acquires a single connection, runs the query, and returns the connection
/// to the pool. The caller decides what failure means; at startup it is
/// fatal.
///
/// # Errors
/// Returns error if a connection cannot be acquired or the query fails
pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// The database's current clock, backing the `/test-db` probe.
///
/// # Errors
/// Returns error if the query fails
pub async fn server_time(pool: &PgPool) -> Result<DateTime<Utc>, sqlx::Error> {
    sqlx::query_scalar("SELECT NOW()").fetch_one(pool).await
}
