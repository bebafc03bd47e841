//! Cache Module
//!
//! The cache table, its row types and the expiry predicate compiled against it.

mod predicate;
mod row;
mod stats;
mod table;

// Re-export public types
pub use predicate::{ExpiryPredicate, PredicateBuilder};
pub use row::{Attribute, AttributeKind, CachedRow, Row, Schema, Value, LOADED_AT_ATTRIBUTE};
pub use stats::TableStats;
pub use table::{CacheTable, InMemoryCacheTable};
