pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod routes;
pub mod telemetry;
pub mod uploads;

use crate::uploads::UploadStore;
use anyhow::Context;
use sqlx::PgPool;
use std::net::SocketAddr;

/// Shared state injected into every handler.
///
/// Constructed once in [`run`]; no globals. Cloning is cheap (pool and
/// upload store are handles).
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub uploads: UploadStore,
    pub public_base_url: Option<String>,
}

pub async fn run(config: config::Config) -> anyhow::Result<()> {
    telemetry::init_tracing(&config.rust_log);

    let uploads = UploadStore::new(&config.uploads_dir);
    uploads
        .ensure_dir()
        .await
        .with_context(|| format!("failed to create uploads directory {}", config.uploads_dir))?;

    let pool = db::init_pool(&config)?;

    // Fail-fast gate: prove the database is reachable before the listener
    // binds. A dead backend means exit 1, not a server answering 500s.
    tracing::info!("Checking database connection...");
    db::health_check(&pool)
        .await
        .context("database health check failed, refusing to start")?;
    tracing::info!("Database connected successfully");

    let state = AppState {
        pool,
        uploads,
        public_base_url: config.public_base_url.clone(),
    };

    let app = routes::routes(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
