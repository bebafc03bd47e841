//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Cache expiry: reconciles the cache table with the backing store at a fixed period

mod expiry;

pub use expiry::{run_cycle, spawn_expiry_task};
