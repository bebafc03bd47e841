//! Response DTOs for the table cache API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{CachedRow, TableStats};
use crate::error_store::ErrorEntry;
use crate::expiry::{ReconcileOutcome, ReconcileStats, SizeEstimate};

/// Response body for GET /rows
#[derive(Debug, Clone, Serialize)]
pub struct RowsResponse {
    /// Cache table id
    pub table: String,
    /// Column names, `loaded_at` last
    pub columns: Vec<String>,
    pub count: usize,
    pub rows: Vec<CachedRow>,
}

/// Response body for GET /stats
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub table: TableStats,
    pub reconcile: ReconcileStats,
    pub estimate: SizeEstimate,
    pub last_outcome: Option<ReconcileOutcome>,
    pub expiry_window_ms: i64,
    pub max_cache_capacity: u64,
}

/// Response body for POST /reconcile
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileResponse {
    pub outcome: ReconcileOutcome,
    /// Rows in the cache after the cycle
    pub total_rows: usize,
}

/// Response body for GET /apps/:app/errors
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEntriesResponse {
    pub app_name: String,
    pub count: usize,
    pub entries: Vec<ErrorEntry>,
}

impl ErrorEntriesResponse {
    pub fn new(app_name: impl Into<String>, entries: Vec<ErrorEntry>) -> Self {
        Self {
            app_name: app_name.into(),
            count: entries.len(),
            entries,
        }
    }
}

/// Response body for DELETE /errors/:id
#[derive(Debug, Clone, Serialize)]
pub struct DiscardResponse {
    /// Success message
    pub message: String,
    pub id: u64,
}

impl DiscardResponse {
    pub fn new(id: u64) -> Self {
        Self {
            message: format!("Error entry {} discarded", id),
            id,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Value;

    #[test]
    fn test_rows_response_serialize() {
        let resp = RowsResponse {
            table: "StockTable".into(),
            columns: vec!["symbol".into(), "loaded_at".into()],
            count: 1,
            rows: vec![CachedRow::stamped(vec![Value::Text("WSO2".into())], 1_000)],
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["rows"][0]["values"][0], "WSO2");
        assert_eq!(json["rows"][0]["loaded_at"], 1_000);
    }

    #[test]
    fn test_discard_response_serialize() {
        let resp = DiscardResponse::new(4);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("discarded"));
        assert!(json.contains("\"id\":4"));
    }

    #[test]
    fn test_error_entries_count() {
        let resp = ErrorEntriesResponse::new("App", Vec::new());
        assert_eq!(resp.count, 0);
        assert_eq!(resp.app_name, "App");
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("Something went wrong"));
    }
}
