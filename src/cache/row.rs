//! Row Module
//!
//! Attribute values, table schemas and cached rows stamped with their load time.

use serde::{Deserialize, Serialize};

use crate::clock::Timestamp;

/// Name of the synthetic attribute appended to every cached row.
pub const LOADED_AT_ATTRIBUTE: &str = "loaded_at";

// == Value ==
/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }
}

/// Attribute values in schema order, as returned by the backing store.
pub type Row = Vec<Value>;

// == Schema ==
/// Declared type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    Bool,
    Int,
    Long,
    Float,
    Double,
    String,
    Object,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AttributeKind,
}

/// Table definition shared by the backing store and the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "table")]
    pub table_id: String,
    pub attributes: Vec<Attribute>,
}

impl Schema {
    pub fn new(table_id: impl Into<String>) -> Self {
        Self {
            table_id: table_id.into(),
            attributes: Vec::new(),
        }
    }

    /// Appends an attribute (builder style).
    pub fn attribute(mut self, name: impl Into<String>, kind: AttributeKind) -> Self {
        self.attributes.push(Attribute {
            name: name.into(),
            kind,
        });
        self
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name == name)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Schema of the cache table: this schema plus the trailing `loaded_at` attribute.
    pub fn cache_schema(&self) -> Schema {
        self.clone()
            .attribute(LOADED_AT_ATTRIBUTE, AttributeKind::Long)
    }
}

// == Cached Row ==
/// A row resident in the cache table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CachedRow {
    pub values: Row,
    pub loaded_at: Timestamp,
}

impl CachedRow {
    /// Stamps a store row with the time it entered the cache.
    pub fn stamped(values: Row, loaded_at: Timestamp) -> Self {
        Self { values, loaded_at }
    }

    /// Reads a timestamp-valued attribute by its position in the cache schema.
    ///
    /// The position one past the last value is the synthetic `loaded_at` column.
    pub fn timestamp_at(&self, index: usize) -> Option<Timestamp> {
        if index == self.values.len() {
            Some(self.loaded_at)
        } else {
            self.values.get(index).and_then(Value::as_i64)
        }
    }
}
