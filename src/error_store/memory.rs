//! In-Memory Error Store
//!
//! Bounded error log; the oldest entries are dropped once it is full.

use std::collections::VecDeque;
use std::sync::{PoisonError, RwLock};

use crate::error::{CacheError, Result};
use crate::error_store::{
    construct_entry, ErrorEntry, ErrorEntryFilter, ErrorStore, ErrorStoreStatus, NewErrorEntry,
};

#[derive(Debug, Default)]
struct ErrorLog {
    next_id: u64,
    entries: VecDeque<(u64, NewErrorEntry)>,
}

#[derive(Debug)]
pub struct InMemoryErrorStore {
    max_entries: usize,
    log: RwLock<ErrorLog>,
}

impl InMemoryErrorStore {
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries: max_entries.max(1),
            log: RwLock::new(ErrorLog {
                next_id: 1,
                entries: VecDeque::new(),
            }),
        }
    }
}

fn matches(stored: &NewErrorEntry, app_name: &str, filter: &ErrorEntryFilter) -> bool {
    stored.app_name == app_name
        && filter
            .stream
            .as_deref()
            .map_or(true, |stream| stored.stream_name == stream)
        && filter
            .occurrence
            .map_or(true, |occurrence| stored.occurrence == occurrence)
        && filter
            .error_type
            .map_or(true, |error_type| stored.error_type == error_type)
}

impl ErrorStore for InMemoryErrorStore {
    fn save_entry(&self, entry: NewErrorEntry) -> Result<()> {
        let mut log = self.log.write().unwrap_or_else(PoisonError::into_inner);
        let id = log.next_id;
        log.next_id += 1;
        log.entries.push_back((id, entry));
        while log.entries.len() > self.max_entries {
            log.entries.pop_front();
        }
        Ok(())
    }

    fn load_entries(&self, app_name: &str, filter: &ErrorEntryFilter) -> Result<Vec<ErrorEntry>> {
        let log = self.log.read().unwrap_or_else(PoisonError::into_inner);
        log.entries
            .iter()
            .filter(|(_, stored)| matches(stored, app_name, filter))
            .skip(filter.offset.unwrap_or(0))
            .take(filter.limit.unwrap_or(usize::MAX))
            .map(|(id, stored)| construct_entry(*id, stored))
            .collect()
    }

    fn discard(&self, id: u64) -> Result<()> {
        let mut log = self.log.write().unwrap_or_else(PoisonError::into_inner);
        let position = log
            .entries
            .iter()
            .position(|(entry_id, _)| *entry_id == id)
            .ok_or_else(|| CacheError::NotFound(format!("error entry {}", id)))?;
        log.entries.remove(position);
        Ok(())
    }

    fn status(&self) -> ErrorStoreStatus {
        let log = self.log.read().unwrap_or_else(PoisonError::into_inner);
        ErrorStoreStatus {
            total_entries: log.entries.len(),
            max_entries: self.max_entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_store::{ErroneousEvent, ErroneousEventType, ErrorDetail, ErrorOccurrence, ErrorType};
    use serde_json::json;

    fn failing_event(n: i64) -> ErroneousEvent {
        ErroneousEvent::new(json!({ "n": n }))
            .with_error(ErrorDetail::new("sink down").with_stack_trace("at publish"))
            .with_original_payload(format!("n={}", n))
    }

    #[test]
    fn test_sink_error_round_trip() {
        let store = InMemoryErrorStore::new(10);
        store.save_on_sink_error("App", &failing_event(1), ErroneousEventType::Event, "Out");

        let entries = store.load_entries("App", &ErrorEntryFilter::default()).unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.id, 1);
        assert_eq!(entry.stream_name, "Out");
        assert_eq!(entry.cause, "sink down");
        assert_eq!(entry.event, json!({ "n": 1 }));
        assert_eq!(entry.stack_trace.as_deref(), Some("at publish"));
        assert_eq!(entry.original_payload.as_deref(), Some("n=1"));
        assert_eq!(entry.occurrence, ErrorOccurrence::StoreOnSinkError);
        assert_eq!(entry.error_type, ErrorType::Transport);
    }

    #[test]
    fn test_before_source_mapping_saves_each_event() {
        let store = InMemoryErrorStore::new(10);
        let events = vec![
            ErroneousEvent::new(json!("<bad/>")),
            ErroneousEvent::new(json!("<worse/>")),
        ];
        store.save_before_source_mapping_error("App", &events, "In");

        let entries = store.load_entries("App", &ErrorEntryFilter::default()).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.error_type == ErrorType::Mapping));
        assert!(entries.iter().all(|e| e.event_type == ErroneousEventType::PayloadString));
        assert_eq!(entries[1].event, json!("<worse/>"));
        assert_eq!(entries[0].cause, "Unknown");
    }

    #[test]
    fn test_load_filters_and_pages() {
        let store = InMemoryErrorStore::new(10);
        for n in 0..4 {
            store.save_on_stream_error("App", &failing_event(n), ErroneousEventType::Event, "A");
        }
        store.save_on_sink_error("App", &failing_event(9), ErroneousEventType::Event, "B");
        store.save_on_sink_error("Other", &failing_event(9), ErroneousEventType::Event, "A");

        let by_stream = ErrorEntryFilter {
            stream: Some("A".into()),
            ..Default::default()
        };
        assert_eq!(store.load_entries("App", &by_stream).unwrap().len(), 4);

        let by_occurrence = ErrorEntryFilter {
            occurrence: Some(ErrorOccurrence::StoreOnSinkError),
            ..Default::default()
        };
        assert_eq!(store.load_entries("App", &by_occurrence).unwrap().len(), 1);

        let page = ErrorEntryFilter {
            stream: Some("A".into()),
            offset: Some(1),
            limit: Some(2),
            ..Default::default()
        };
        let ids: Vec<u64> = store.load_entries("App", &page).unwrap().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_discard() {
        let store = InMemoryErrorStore::new(10);
        store.save_on_sink_error("App", &failing_event(1), ErroneousEventType::Event, "S");

        store.discard(1).unwrap();
        assert_eq!(store.status().total_entries, 0);
        assert!(matches!(store.discard(1), Err(CacheError::NotFound(_))));
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let store = InMemoryErrorStore::new(2);
        for n in 0..3 {
            store.save_on_sink_error("App", &failing_event(n), ErroneousEventType::Event, "S");
        }

        let ids: Vec<u64> = store
            .load_entries("App", &ErrorEntryFilter::default())
            .unwrap()
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(
            store.status(),
            ErrorStoreStatus {
                total_entries: 2,
                max_entries: 2
            }
        );
    }
}
