//! samplebin-web — community sample-sharing service
//!
//! Startup sequence: tracing, configuration, database, media storage,
//! orphaned-file reconciliation, then the HTTP server.

use anyhow::Result;
use samplebin_common::config::Config;
use samplebin_common::db;
use samplebin_web::storage::Storage;
use samplebin_web::{build_router, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting samplebin-web v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    info!("Database path: {}", config.db_path.display());
    info!("Data directory: {}", config.data_dir.display());

    let pool = db::init_database(&config.db_path).await?;

    let storage = Storage::new(&config.data_dir);
    storage.ensure_dirs()?;

    // Reclaim files orphaned by a crash between write and persist
    storage.reconcile(&pool).await?;

    let state = AppState::new(pool, storage);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("samplebin-web listening on http://0.0.0.0:{}", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
