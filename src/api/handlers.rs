//! API Handlers
//!
//! HTTP request handlers for each table cache endpoint.

use std::sync::Arc;
use tokio::sync::Mutex;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::cache::{CacheTable, InMemoryCacheTable};
use crate::clock::duration_ms;
use crate::error::{CacheError, Result};
use crate::error_store::ErrorStore;
use crate::expiry::ReconciliationEngine;
use crate::models::{
    DiscardResponse, ErrorEntriesResponse, ErrorQuery, HealthResponse, ReconcileResponse,
    RowsResponse, StatsResponse,
};
use crate::tasks::run_cycle;

/// Application state shared across all handlers.
///
/// The engine sits behind an async mutex shared with the expiry task, so a
/// manual reconcile never overlaps a scheduled one.
#[derive(Clone)]
pub struct AppState {
    /// Cache table served to readers
    pub table: Arc<InMemoryCacheTable>,
    /// Reconciliation engine driving the table
    pub engine: Arc<Mutex<ReconciliationEngine>>,
    /// Erroneous event log
    pub errors: Arc<dyn ErrorStore>,
}

impl AppState {
    /// Creates a new AppState from its parts.
    pub fn new(
        table: Arc<InMemoryCacheTable>,
        engine: ReconciliationEngine,
        errors: Arc<dyn ErrorStore>,
    ) -> Self {
        Self {
            table,
            engine: Arc::new(Mutex::new(engine)),
            errors,
        }
    }
}

/// Handler for GET /rows
///
/// Returns a snapshot of the cached rows.
pub async fn rows_handler(State(state): State<AppState>) -> Json<RowsResponse> {
    let schema = state.table.schema();
    let rows = state.table.rows();

    Json(RowsResponse {
        table: schema.table_id.clone(),
        columns: schema.attributes.iter().map(|a| a.name.clone()).collect(),
        count: rows.len(),
        rows,
    })
}

/// Handler for GET /stats
///
/// Returns table counters and the engine's view of the store.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let engine = state.engine.lock().await;
    let config = engine.config();

    Json(StatsResponse {
        table: state.table.stats(),
        reconcile: engine.stats().clone(),
        estimate: engine.estimate(),
        last_outcome: engine.last_outcome().cloned(),
        expiry_window_ms: duration_ms(config.expiry_window),
        max_cache_capacity: config.max_cache_capacity,
    })
}

/// Handler for POST /reconcile
///
/// Runs a reconciliation cycle immediately.
pub async fn reconcile_handler(State(state): State<AppState>) -> Result<Json<ReconcileResponse>> {
    let outcome = run_cycle(state.engine.clone())
        .await
        .map_err(|e| CacheError::Internal(format!("reconciliation cycle failed: {}", e)))?;

    Ok(Json(ReconcileResponse {
        outcome,
        total_rows: state.table.len(),
    }))
}

/// Handler for GET /apps/:app/errors
///
/// Lists stored erroneous events of one application.
pub async fn errors_handler(
    State(state): State<AppState>,
    Path(app): Path<String>,
    Query(query): Query<ErrorQuery>,
) -> Result<Json<ErrorEntriesResponse>> {
    // Validate request
    if let Some(error_msg) = query.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let entries = state.errors.load_entries(&app, &query.into_filter())?;
    Ok(Json(ErrorEntriesResponse::new(app, entries)))
}

/// Handler for DELETE /errors/:id
///
/// Discards a stored erroneous event.
pub async fn discard_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<DiscardResponse>> {
    state.errors.discard(id)?;
    Ok(Json(DiscardResponse::new(id)))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
