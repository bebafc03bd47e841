//! Expiry Module
//!
//! Periodic reconciliation of the cache table against the backing store.
//!
//! Each cycle either mirrors the store in full (when its measured size fits the
//! cache) or prunes cached rows older than the expiry window. The store size is
//! re-measured at most every staleness window; a measuring cycle reuses the rows
//! it fetched, so it never queries the store twice.

mod engine;
mod estimator;
mod stats;


pub use engine::{ReconcileAction, ReconcileOutcome, ReconciliationEngine};
pub use estimator::{SizeEstimate, StoreSizeEstimator};
pub use stats::ReconcileStats;
