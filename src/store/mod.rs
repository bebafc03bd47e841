//! Backing Store Module
//!
//! The slower, queryable store the cache fronts.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};

use crate::cache::{Row, Schema};
use crate::clock::Timestamp;
use crate::error::Result;

/// Size bookkeeping persisted alongside the store between cycles.
///
/// `estimated_size` is `-1` while unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeMetadata {
    pub estimated_size: i64,
    pub last_checked: Timestamp,
}

impl SizeMetadata {
    pub const UNKNOWN_SIZE: i64 = -1;

    pub fn unknown() -> Self {
        Self {
            estimated_size: Self::UNKNOWN_SIZE,
            last_checked: 0,
        }
    }
}

impl Default for SizeMetadata {
    fn default() -> Self {
        Self::unknown()
    }
}

/// A store whose full candidate row set can be fetched for caching.
pub trait BackingStore: Send + Sync {
    /// Schema of the rows returned by [`BackingStore::query_full`].
    fn schema(&self) -> &Schema;

    /// Runs the store's standing caching condition and projection.
    ///
    /// # Errors
    /// `StoreUnavailable` when the store cannot be reached. Implementations own
    /// their timeout policy and must fail rather than block indefinitely.
    fn query_full(&self) -> Result<Vec<Row>>;

    fn size_metadata(&self) -> SizeMetadata {
        SizeMetadata::unknown()
    }

    fn set_size_metadata(&self, _metadata: SizeMetadata) {}
}
