//! Table Cache - a time-bounded front-cache for a queryable backing store
//!
//! Serves the cached table over HTTP while a background task reconciles it
//! with the backing store.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use table_cache::api::create_router;
use table_cache::cache::InMemoryCacheTable;
use table_cache::clock::SystemClock;
use table_cache::error_store::InMemoryErrorStore;
use table_cache::store::{BackingStore, JsonFileStore};
use table_cache::{spawn_expiry_task, AppState, Config, ReconciliationEngine};

/// Main entry point for the table cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the backing store and bind the reconciliation engine to its schema
/// 4. Start background expiry task
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "table_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting table cache server");

    // Load configuration from environment variables
    let config = Config::from_env();
    info!(
        "Configuration loaded: expiry_window={}ms, max_cache_capacity={}, reconcile_interval={}ms, port={}",
        config.expiry_window_ms,
        config.max_cache_capacity,
        config.reconcile_interval_ms,
        config.server_port
    );

    let store = Arc::new(
        JsonFileStore::open(&config.store_path)
            .with_context(|| format!("opening backing store {}", config.store_path.display()))?,
    );
    let table = Arc::new(InMemoryCacheTable::new(store.schema()));

    // Schema binding failures abort startup here
    let engine = ReconciliationEngine::new(
        config.cache_config(),
        store.clone(),
        table.clone(),
        Arc::new(SystemClock),
    )
    .context("initializing reconciliation engine")?;

    let errors = Arc::new(InMemoryErrorStore::new(config.error_store_max_entries));
    let state = AppState::new(table, engine, errors);
    info!("Cache table for '{}' initialized", store.schema().table_id);

    // Start background expiry task
    let expiry_handle = spawn_expiry_task(state.engine.clone(), config.reconcile_interval());
    info!("Background expiry task started");

    // Create router with all endpoints
    let app = create_router(state);

    // Bind to configured port
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Server listening on http://{}", addr);

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(expiry_handle))
        .await
        .context("serving HTTP")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the expiry task and allows graceful shutdown.
async fn shutdown_signal(expiry_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    // Abort the expiry task
    expiry_handle.abort();
    warn!("Expiry task aborted");
}
