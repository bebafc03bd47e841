//! Cache Table Module
//!
//! The in-memory mirror the reconciliation engine adds to and deletes from.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::cache::{CachedRow, ExpiryPredicate, Schema, TableStats};

/// Storage consumed by the reconciliation engine.
///
/// `add` and `delete` are each atomic with respect to concurrent readers. The
/// pair is not: a reader may observe the table between a delete and its add.
pub trait CacheTable: Send + Sync {
    /// Appends rows in order. No deduplication.
    fn add(&self, rows: Vec<CachedRow>);

    /// Removes every row matching the predicate and returns how many were removed.
    fn delete(&self, predicate: &ExpiryPredicate) -> usize;

    /// Snapshot of the current rows.
    fn rows(&self) -> Vec<CachedRow>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
struct TableInner {
    rows: Vec<CachedRow>,
    stats: TableStats,
}

// == In-Memory Cache Table ==
/// Vec-backed cache table behind a read/write lock.
#[derive(Debug)]
pub struct InMemoryCacheTable {
    schema: Schema,
    inner: RwLock<TableInner>,
}

impl InMemoryCacheTable {
    /// Creates an empty table for the given store schema.
    ///
    /// The table's own schema carries the trailing `loaded_at` attribute.
    pub fn new(store_schema: &Schema) -> Self {
        Self {
            schema: store_schema.cache_schema(),
            inner: RwLock::new(TableInner::default()),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn stats(&self) -> TableStats {
        let inner = self.read();
        let mut stats = inner.stats.clone();
        stats.set_total_rows(inner.rows.len());
        stats
    }

    // A panicking reader cannot leave the Vec half-mutated, so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, TableInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TableInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CacheTable for InMemoryCacheTable {
    fn add(&self, rows: Vec<CachedRow>) {
        let mut inner = self.write();
        inner.stats.record_added(rows.len());
        inner.rows.extend(rows);
        let total = inner.rows.len();
        inner.stats.set_total_rows(total);
    }

    fn delete(&self, predicate: &ExpiryPredicate) -> usize {
        let mut inner = self.write();
        let before = inner.rows.len();
        inner.rows.retain(|row| !predicate.matches(row));
        let removed = before - inner.rows.len();

        let total = inner.rows.len();
        inner.stats.record_deleted(removed);
        inner.stats.set_total_rows(total);
        removed
    }

    fn rows(&self) -> Vec<CachedRow> {
        self.read().rows.clone()
    }

    fn len(&self) -> usize {
        self.read().rows.len()
    }
}
