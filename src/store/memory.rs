//! Memory Store Module
//!
//! Lock-guarded in-process backing store with switchable availability.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

use crate::cache::{Row, Schema};
use crate::error::{CacheError, Result};
use crate::store::{BackingStore, SizeMetadata};

#[derive(Debug)]
pub struct MemoryStore {
    schema: Schema,
    rows: RwLock<Vec<Row>>,
    available: AtomicBool,
    queries: AtomicU64,
    size_metadata: Mutex<SizeMetadata>,
}

impl MemoryStore {
    pub fn new(schema: Schema, rows: Vec<Row>) -> Self {
        Self {
            schema,
            rows: RwLock::new(rows),
            available: AtomicBool::new(true),
            queries: AtomicU64::new(0),
            size_metadata: Mutex::new(SizeMetadata::unknown()),
        }
    }

    /// Replaces the stored rows.
    pub fn set_rows(&self, rows: Vec<Row>) {
        *self.rows.write().unwrap_or_else(PoisonError::into_inner) = rows;
    }

    /// Makes subsequent queries fail with `StoreUnavailable` while false.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of `query_full` calls received, failed ones included.
    pub fn query_count(&self) -> u64 {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.rows.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BackingStore for MemoryStore {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn query_full(&self) -> Result<Vec<Row>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if !self.available.load(Ordering::SeqCst) {
            return Err(CacheError::StoreUnavailable(format!(
                "store '{}' is offline",
                self.schema.table_id
            )));
        }
        Ok(self
            .rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn size_metadata(&self) -> SizeMetadata {
        *self
            .size_metadata
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn set_size_metadata(&self, metadata: SizeMetadata) {
        *self
            .size_metadata
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = metadata;
    }
}
