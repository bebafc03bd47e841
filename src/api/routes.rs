//! API Routes
//!
//! Configures the Axum router with all table cache endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    discard_handler, errors_handler, health_handler, reconcile_handler, rows_handler,
    stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /rows` - Snapshot of the cached rows
/// - `GET /stats` - Table and reconciliation statistics
/// - `POST /reconcile` - Run a reconciliation cycle now
/// - `GET /apps/:app/errors` - Stored erroneous events of an application
/// - `DELETE /errors/:id` - Discard a stored erroneous event
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with all endpoints
    Router::new()
        .route("/rows", get(rows_handler))
        .route("/stats", get(stats_handler))
        .route("/reconcile", post(reconcile_handler))
        .route("/apps/:app/errors", get(errors_handler))
        .route("/errors/:id", delete(discard_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
