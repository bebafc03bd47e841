//! Table Cache - a time-bounded front-cache for a queryable backing store
//!
//! Keeps a working copy of backing-store rows in memory and periodically either
//! mirrors the store or prunes rows older than the expiry window.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod error_store;
pub mod expiry;
pub mod models;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use config::{CacheConfig, Config};
pub use error::{CacheError, Result};
pub use expiry::ReconciliationEngine;
pub use tasks::spawn_expiry_task;
