mod config;
mod registry;
mod probe;
mod cache;
mod cache_manager;
mod snapshot;
mod presenter;
mod api;

use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use anyhow::{Context, Result};
use crate::cache::{db::SnapshotDb, ResultCache};
use crate::cache_manager::StoreHandle;
use crate::config::Config;
use crate::probe::checker::TcpChecker;
use crate::registry::Registry;
use crate::snapshot::SnapshotBuilder;

const DEFAULT_CONFIG_PATH: &str = "/etc/probe-status/probe-statusd.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("probe_statusd=info"))
        )
        .init();

    tracing::info!("Starting probe-statusd");

    // Load config
    let config = load_config()?;

    tracing::info!(
        "Probing destinations from {} (timeout {}ms, cache ttl {}ms)",
        config.probe.destinations_path.display(),
        config.probe.timeout_ms,
        config.cache.ttl_ms
    );

    // Open SQLite snapshot store, if configured
    let store = match &config.cache.db_path {
        Some(path) => {
            let db = SnapshotDb::open(path)?;
            tracing::info!("Opened snapshot store at {:?}", path);
            Some(StoreHandle::spawn(db))
        }
        None => None,
    };

    // Build the probe pipeline
    let checker = Arc::new(TcpChecker::new(config.probe.timeout()));
    let mut builder = SnapshotBuilder::new(
        Registry::new(&config.probe.destinations_path),
        checker,
        ResultCache::new(config.cache.ttl()),
    )
    .with_concurrency(config.probe.concurrency);
    if let Some(store) = &store {
        builder = builder.with_store(store.clone());
    }

    // Build API router
    let app_state = api::routes::AppState {
        builder: Arc::new(builder),
        probe: Arc::new(config.probe.clone()),
        cache: Arc::new(config.cache.clone()),
    };
    let app = api::routes::router(app_state);

    // Bind HTTP server
    let listener = tokio::net::TcpListener::bind(&config.api.listen)
        .await
        .with_context(|| format!("Failed to bind to {}", config.api.listen))?;

    tracing::info!("API listening on {}", config.api.listen);

    // Create cancellation token for graceful shutdown
    let cancel = CancellationToken::new();

    // Run server with graceful shutdown
    let server_cancel = cancel.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async move { server_cancel.cancelled().await })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutdown signal received");

    // Trigger cancellation
    cancel.cancel();

    // Wait for the server to drain
    let _ = server_handle.await;

    // Shutdown store thread
    if let Some(store) = store {
        if let Err(e) = store.shutdown().await {
            tracing::error!("Failed to shutdown snapshot store: {}", e);
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// An explicit path must load. Without one, the default path is used if it
/// exists and built-in defaults otherwise.
fn load_config() -> Result<Config> {
    match std::env::args().nth(1) {
        Some(path) => {
            let config = Config::load(&path)
                .with_context(|| format!("Failed to load config from {}", path))?;
            tracing::info!("Loaded config from {}", path);
            Ok(config)
        }
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            let config = Config::load(DEFAULT_CONFIG_PATH)
                .with_context(|| format!("Failed to load config from {}", DEFAULT_CONFIG_PATH))?;
            tracing::info!("Loaded config from {}", DEFAULT_CONFIG_PATH);
            Ok(config)
        }
        None => {
            tracing::info!("No config file at {}, using defaults", DEFAULT_CONFIG_PATH);
            Ok(Config::default())
        }
    }
}
