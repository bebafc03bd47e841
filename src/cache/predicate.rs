//! Expiry Predicate Module
//!
//! Binds the cache schema once and compiles per-cycle "row age exceeds threshold"
//! predicates against it.

use std::collections::HashSet;
use std::time::Duration;

use crate::cache::{CachedRow, Schema, LOADED_AT_ATTRIBUTE};
use crate::clock::{duration_ms, Timestamp};
use crate::error::{CacheError, Result};

// == Expiry Predicate ==
/// A compiled comparison over cached rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryPredicate {
    /// Matches rows where `now_reference - loaded_at > threshold_ms`.
    AgeExceeds {
        now_reference: Timestamp,
        threshold_ms: i64,
        loaded_at_index: usize,
    },
}

impl ExpiryPredicate {
    /// Returns true if the row should be selected by this predicate.
    ///
    /// Strict comparison: a row exactly `threshold_ms` old is retained.
    pub fn matches(&self, row: &CachedRow) -> bool {
        match *self {
            ExpiryPredicate::AgeExceeds {
                now_reference,
                threshold_ms,
                loaded_at_index,
            } => row
                .timestamp_at(loaded_at_index)
                .map(|loaded_at| now_reference.saturating_sub(loaded_at) > threshold_ms)
                .unwrap_or(false),
        }
    }

    pub fn now_reference(&self) -> Timestamp {
        match *self {
            ExpiryPredicate::AgeExceeds { now_reference, .. } => now_reference,
        }
    }
}

// == Predicate Builder ==
/// Schema binding for expiry predicates, resolved once at engine construction.
#[derive(Debug, Clone)]
pub struct PredicateBuilder {
    table_id: String,
    loaded_at_index: usize,
}

impl PredicateBuilder {
    /// Binds the store schema to the cache's synthetic `loaded_at` column.
    ///
    /// # Errors
    /// `SchemaBinding` when the table id is empty, attribute names repeat, or the
    /// store already declares a `loaded_at` attribute.
    pub fn bind(schema: &Schema) -> Result<Self> {
        if schema.table_id.trim().is_empty() {
            return Err(CacheError::SchemaBinding(
                "table id must not be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for attribute in &schema.attributes {
            if attribute.name == LOADED_AT_ATTRIBUTE {
                return Err(CacheError::SchemaBinding(format!(
                    "table '{}' already declares reserved attribute '{}'",
                    schema.table_id, LOADED_AT_ATTRIBUTE
                )));
            }
            if !seen.insert(attribute.name.as_str()) {
                return Err(CacheError::SchemaBinding(format!(
                    "table '{}' declares attribute '{}' more than once",
                    schema.table_id, attribute.name
                )));
            }
        }

        let cache_schema = schema.cache_schema();
        let loaded_at_index = cache_schema
            .position(LOADED_AT_ATTRIBUTE)
            .ok_or_else(|| CacheError::SchemaBinding("loaded_at not resolvable".to_string()))?;

        Ok(Self {
            table_id: schema.table_id.clone(),
            loaded_at_index,
        })
    }

    /// Compiles `now_reference - loaded_at > threshold`.
    pub fn compile(&self, now_reference: Timestamp, threshold: Duration) -> ExpiryPredicate {
        ExpiryPredicate::AgeExceeds {
            now_reference,
            threshold_ms: duration_ms(threshold),
            loaded_at_index: self.loaded_at_index,
        }
    }

    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    pub fn loaded_at_index(&self) -> usize {
        self.loaded_at_index
    }
}
