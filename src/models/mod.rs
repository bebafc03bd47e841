//! Request and Response models for the table cache API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::ErrorQuery;
pub use responses::{
    DiscardResponse, ErrorEntriesResponse, ErrorResponse, HealthResponse, ReconcileResponse,
    RowsResponse, StatsResponse,
};
