//! Error Store Models
//!
//! Taxonomy and records for events that failed somewhere in the pipeline.

use serde::{Deserialize, Serialize};

use crate::clock::Timestamp;

// == Taxonomy ==
/// Where in the pipeline the event failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorOccurrence {
    BeforeSourceMapping,
    StoreOnSinkError,
    StoreOnStreamError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    Mapping,
    Transport,
}

/// Shape of the stored event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErroneousEventType {
    /// Raw payload, stored as its string form
    PayloadString,
    Event,
    ComplexEvent,
    ReplayableTableRecord,
}

// == Erroneous Event ==
/// The failure attached to an erroneous event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    /// Message of the underlying cause, when there is one
    #[serde(default)]
    pub cause: Option<String>,
    #[serde(default)]
    pub stack_trace: Option<String>,
}

impl ErrorDetail {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
            stack_trace: None,
        }
    }

    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn with_stack_trace(mut self, stack_trace: impl Into<String>) -> Self {
        self.stack_trace = Some(stack_trace.into());
        self
    }
}

/// An event handed to the error store, with whatever is known about its failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErroneousEvent {
    pub event: Option<serde_json::Value>,
    pub error: Option<ErrorDetail>,
    pub original_payload: Option<String>,
}

impl ErroneousEvent {
    pub fn new(event: serde_json::Value) -> Self {
        Self {
            event: Some(event),
            ..Self::default()
        }
    }

    pub fn with_error(mut self, error: ErrorDetail) -> Self {
        self.error = Some(error);
        self
    }

    pub fn with_original_payload(mut self, payload: impl Into<String>) -> Self {
        self.original_payload = Some(payload.into());
        self
    }

    /// Inner cause, else the error message, else `"Unknown"`.
    pub fn cause(&self) -> String {
        match &self.error {
            Some(detail) => detail
                .cause
                .clone()
                .unwrap_or_else(|| detail.message.clone()),
            None => "Unknown".to_string(),
        }
    }
}

// == Entries ==
/// Serialized form written by [`super::ErrorStore::save_entry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewErrorEntry {
    pub timestamp: Timestamp,
    pub app_name: String,
    pub stream_name: String,
    pub event: Vec<u8>,
    pub cause: String,
    pub stack_trace: Vec<u8>,
    pub original_payload: Vec<u8>,
    pub occurrence: ErrorOccurrence,
    pub event_type: ErroneousEventType,
    pub error_type: ErrorType,
}

/// A stored entry, decoded for readers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorEntry {
    pub id: u64,
    pub timestamp: Timestamp,
    pub app_name: String,
    pub stream_name: String,
    pub event: serde_json::Value,
    pub cause: String,
    pub stack_trace: Option<String>,
    pub original_payload: Option<String>,
    pub occurrence: ErrorOccurrence,
    pub event_type: ErroneousEventType,
    pub error_type: ErrorType,
}

/// Narrows `load_entries`. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorEntryFilter {
    pub stream: Option<String>,
    pub occurrence: Option<ErrorOccurrence>,
    pub error_type: Option<ErrorType>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorStoreStatus {
    pub total_entries: usize,
    pub max_entries: usize,
}
