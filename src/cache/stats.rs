//! Table Statistics Module
//!
//! Tracks row movement through the cache table.

use serde::Serialize;

// == Table Stats ==
/// Counters for rows added to and deleted from the cache table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableStats {
    /// Rows appended by `add`
    pub rows_added: u64,
    /// Rows removed by `delete`
    pub rows_deleted: u64,
    /// Number of `delete` calls issued
    pub delete_calls: u64,
    /// Current number of rows in the table
    pub total_rows: usize,
}

impl TableStats {
    // == Constructor ==
    /// Creates a new TableStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Add ==
    pub fn record_added(&mut self, count: usize) {
        self.rows_added += count as u64;
    }

    // == Record Delete ==
    /// Records one delete call and the rows it removed.
    pub fn record_deleted(&mut self, count: usize) {
        self.delete_calls += 1;
        self.rows_deleted += count as u64;
    }

    // == Update Row Count ==
    pub fn set_total_rows(&mut self, count: usize) {
        self.total_rows = count;
    }
}
