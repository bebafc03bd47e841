//! API Module
//!
//! HTTP handlers and routing for the table cache REST API.
//!
//! # Endpoints
//! - `GET /rows` - Snapshot of the cached rows
//! - `GET /stats` - Table and reconciliation statistics
//! - `POST /reconcile` - Run a reconciliation cycle now
//! - `GET /apps/:app/errors` - Stored erroneous events
//! - `DELETE /errors/:id` - Discard an erroneous event
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
