//! Error Store Module
//!
//! Persists events that failed mapping, sinking or stream processing so they can
//! be inspected and discarded later.

mod memory;
mod model;

pub use memory::InMemoryErrorStore;
pub use model::{
    ErroneousEvent, ErroneousEventType, ErrorDetail, ErrorEntry, ErrorEntryFilter,
    ErrorOccurrence, ErrorStoreStatus, ErrorType, NewErrorEntry,
};

use tracing::error;

use crate::error::{CacheError, Result};

/// Storage for erroneous events.
///
/// Implementors provide the raw persistence; the classification helpers and
/// serialization are shared.
pub trait ErrorStore: Send + Sync {
    fn save_entry(&self, entry: NewErrorEntry) -> Result<()>;

    fn load_entries(&self, app_name: &str, filter: &ErrorEntryFilter) -> Result<Vec<ErrorEntry>>;

    /// # Errors
    /// `NotFound` if no entry has this id.
    fn discard(&self, id: u64) -> Result<()>;

    fn status(&self) -> ErrorStoreStatus;

    /// Serializes and persists one event.
    fn save(
        &self,
        app_name: &str,
        stream_name: &str,
        event: &ErroneousEvent,
        event_type: ErroneousEventType,
        occurrence: ErrorOccurrence,
        error_type: ErrorType,
    ) -> Result<()> {
        let entry = NewErrorEntry {
            timestamp: chrono::Utc::now().timestamp_millis(),
            app_name: app_name.to_string(),
            stream_name: stream_name.to_string(),
            event: encode_event(event, event_type)?,
            cause: event.cause(),
            stack_trace: encode(
                &event
                    .error
                    .as_ref()
                    .and_then(|detail| detail.stack_trace.clone()),
            )?,
            original_payload: encode(&event.original_payload)?,
            occurrence,
            event_type,
            error_type,
        };
        self.save_entry(entry)
    }

    fn save_before_source_mapping_error(
        &self,
        app_name: &str,
        events: &[ErroneousEvent],
        stream_name: &str,
    ) {
        for event in events {
            if let Err(err) = self.save(
                app_name,
                stream_name,
                event,
                ErroneousEventType::PayloadString,
                ErrorOccurrence::BeforeSourceMapping,
                ErrorType::Mapping,
            ) {
                error!(app = app_name, stream = stream_name, error = %err, "Failed to save erroneous event");
            }
        }
    }

    fn save_on_sink_error(
        &self,
        app_name: &str,
        event: &ErroneousEvent,
        event_type: ErroneousEventType,
        stream_name: &str,
    ) {
        if let Err(err) = self.save(
            app_name,
            stream_name,
            event,
            event_type,
            ErrorOccurrence::StoreOnSinkError,
            ErrorType::Transport,
        ) {
            error!(app = app_name, stream = stream_name, error = %err, "Failed to save erroneous event");
        }
    }

    fn save_on_stream_error(
        &self,
        app_name: &str,
        event: &ErroneousEvent,
        event_type: ErroneousEventType,
        stream_name: &str,
    ) {
        if let Err(err) = self.save(
            app_name,
            stream_name,
            event,
            event_type,
            ErrorOccurrence::StoreOnStreamError,
            ErrorType::Transport,
        ) {
            error!(app = app_name, stream = stream_name, error = %err, "Failed to save erroneous event");
        }
    }
}

// == Encoding ==
fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value)
        .map_err(|e| CacheError::ErrorStore(format!("failure during byte conversion: {}", e)))
}

/// Payload-string events are stored as their string form.
fn encode_event(event: &ErroneousEvent, event_type: ErroneousEventType) -> Result<Vec<u8>> {
    match (&event.event, event_type) {
        (Some(serde_json::Value::String(s)), ErroneousEventType::PayloadString) => encode(s),
        (Some(value), ErroneousEventType::PayloadString) => encode(&value.to_string()),
        (value, _) => encode(value),
    }
}

fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes)
        .map_err(|e| CacheError::ErrorStore(format!("failure during byte conversion: {}", e)))
}

/// Rebuilds a readable entry from its stored form.
pub fn construct_entry(id: u64, stored: &NewErrorEntry) -> Result<ErrorEntry> {
    Ok(ErrorEntry {
        id,
        timestamp: stored.timestamp,
        app_name: stored.app_name.clone(),
        stream_name: stored.stream_name.clone(),
        event: decode(&stored.event)?,
        cause: stored.cause.clone(),
        stack_trace: decode(&stored.stack_trace)?,
        original_payload: decode(&stored.original_payload)?,
        occurrence: stored.occurrence,
        event_type: stored.event_type,
        error_type: stored.error_type,
    })
}
