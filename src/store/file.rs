//! JSON File Store Module
//!
//! Backing store read from a JSON document on every query.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::Deserialize;
use tracing::warn;

use crate::cache::{Row, Schema};
use crate::error::{CacheError, Result};
use crate::store::{BackingStore, SizeMetadata};

/// On-disk layout: `{ "table": .., "attributes": [..], "rows": [[..], ..] }`.
#[derive(Debug, Deserialize)]
struct StoreDocument {
    #[serde(flatten)]
    schema: Schema,
    #[serde(default)]
    rows: Vec<Row>,
}

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    schema: Schema,
    size_metadata: Mutex<SizeMetadata>,
}

impl JsonFileStore {
    /// Opens the store and reads its schema. The schema is fixed from here on.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let document = read_document(&path)?;
        Ok(Self {
            path,
            schema: document.schema,
            size_metadata: Mutex::new(SizeMetadata::unknown()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_document(path: &Path) -> Result<StoreDocument> {
    let raw = fs::read_to_string(path).map_err(|e| {
        CacheError::StoreUnavailable(format!("cannot read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&raw).map_err(|e| {
        CacheError::StoreUnavailable(format!("cannot parse {}: {}", path.display(), e))
    })
}

impl BackingStore for JsonFileStore {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn query_full(&self) -> Result<Vec<Row>> {
        let document = read_document(&self.path)?;
        let arity = self.schema.len();
        let (rows, malformed): (Vec<Row>, Vec<Row>) =
            document.rows.into_iter().partition(|row| row.len() == arity);

        if !malformed.is_empty() {
            warn!(
                table = %self.schema.table_id,
                skipped = malformed.len(),
                "Skipping rows whose arity does not match the schema"
            );
        }
        Ok(rows)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Value;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("table_cache_{}_{}.json", name, nanos))
    }

    const DOCUMENT: &str = r#"{
        "table": "StockTable",
        "attributes": [
            {"name": "symbol", "type": "string"},
            {"name": "price", "type": "double"}
        ],
        "rows": [["WSO2", 55.6], ["IBM", 75.5], ["broken"]]
    }"#;

    #[test]
    fn test_open_reads_schema() {
        let path = temp_path("schema");
        fs::write(&path, DOCUMENT).unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.schema().table_id, "StockTable");
        assert_eq!(store.schema().len(), 2);
        assert_eq!(store.path(), path.as_path());

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_query_full_skips_malformed_rows() {
        let path = temp_path("rows");
        fs::write(&path, DOCUMENT).unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        let rows = store.query_full().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0], Value::Text("IBM".into()));

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let path = temp_path("gone");
        fs::write(&path, DOCUMENT).unwrap();
        let store = JsonFileStore::open(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert!(matches!(
            store.query_full(),
            Err(CacheError::StoreUnavailable(_))
        ));
    }

    #[test]
    fn test_open_rejects_invalid_document() {
        let path = temp_path("invalid");
        fs::write(&path, "{ not json").unwrap();

        assert!(JsonFileStore::open(&path).is_err());

        fs::remove_file(path).unwrap();
    }
}
