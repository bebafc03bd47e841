//! End-to-end reconciliation scenarios driven by a manual clock.

use std::sync::Arc;
use std::time::Duration;

use table_cache::{
    cache::{AttributeKind, CacheTable, CachedRow, InMemoryCacheTable, Row, Schema, Value},
    clock::{ManualClock, Timestamp},
    expiry::ReconcileAction,
    store::{BackingStore, MemoryStore, SizeMetadata},
    CacheConfig, CacheError, ReconciliationEngine,
};

const T0: Timestamp = 1_700_000_000_000;

fn schema() -> Schema {
    Schema::new("StockTable")
        .attribute("symbol", AttributeKind::String)
        .attribute("price", AttributeKind::Double)
}

fn rows(count: usize) -> Vec<Row> {
    (0..count)
        .map(|i| vec![Value::Text(format!("SYM{i}")), Value::Float(i as f64 * 1.5)])
        .collect()
}

struct Fixture {
    engine: ReconciliationEngine,
    store: Arc<MemoryStore>,
    table: Arc<InMemoryCacheTable>,
    clock: Arc<ManualClock>,
}

/// `expiry_window = 1000ms`, `max_cache_capacity = 100`.
fn fixture(store_rows: usize) -> Fixture {
    let store = Arc::new(MemoryStore::new(schema(), rows(store_rows)));
    let table = Arc::new(InMemoryCacheTable::new(&schema()));
    let clock = Arc::new(ManualClock::new(T0));
    let engine = ReconciliationEngine::new(
        CacheConfig::new(Duration::from_millis(1_000), 100),
        store.clone(),
        table.clone(),
        clock.clone(),
    )
    .unwrap();
    Fixture {
        engine,
        store,
        table,
        clock,
    }
}

#[test]
fn test_small_store_is_mirrored_and_refreshed() {
    let mut f = fixture(50);

    let first = f.engine.reconcile();
    assert_eq!(first.action, ReconcileAction::MirrorReload);
    assert_eq!(first.measured, Some(50));
    let cached = f.table.rows();
    assert_eq!(cached.len(), 50);
    assert!(cached.iter().all(|r| r.loaded_at == T0));

    f.clock.advance(Duration::from_millis(500));
    let second = f.engine.reconcile();
    assert_eq!(second.action, ReconcileAction::MirrorReload);
    assert_eq!(second.measured, None);

    let refreshed = f.table.rows();
    assert_eq!(refreshed.len(), 50);
    assert!(refreshed.iter().all(|r| r.loaded_at == T0 + 500));

    let before: Vec<Row> = cached.into_iter().map(|r| r.values).collect();
    let after: Vec<Row> = refreshed.into_iter().map(|r| r.values).collect();
    assert_eq!(before, after);
}

#[test]
fn test_large_store_only_prunes_existing_rows() {
    let mut f = fixture(150);
    let live = |symbol: &str, loaded_at| {
        CachedRow::stamped(vec![Value::Text(symbol.into()), Value::Float(1.0)], loaded_at)
    };
    f.table.add(vec![
        live("expired", T0 - 1_001),
        live("boundary", T0 - 1_000),
        live("fresh", T0 - 10),
    ]);

    let outcome = f.engine.reconcile();

    assert_eq!(outcome.action, ReconcileAction::PruneOnly);
    assert_eq!(outcome.measured, Some(150));
    assert_eq!(outcome.rows_added, 0);
    assert_eq!(f.store.query_count(), 1);
    assert_eq!(
        f.table.rows(),
        vec![live("boundary", T0 - 1_000), live("fresh", T0 - 10)]
    );
}

#[test]
fn test_store_outage_while_measuring() {
    let mut f = fixture(50);
    let existing = CachedRow::stamped(vec![Value::Text("kept".into()), Value::Float(0.0)], T0 - 50_000);
    f.table.add(vec![existing.clone()]);
    f.store.set_available(false);

    let outcome = f.engine.reconcile();

    assert_eq!(outcome.action, ReconcileAction::StoreUnavailable);
    assert_eq!(f.table.rows(), vec![existing]);
    assert_eq!(f.engine.estimate().row_count, None);
    assert_eq!(f.store.size_metadata(), SizeMetadata::unknown());

    f.store.set_available(true);
    f.clock.advance(Duration::from_secs(5));
    let recovered = f.engine.reconcile();
    assert_eq!(recovered.action, ReconcileAction::MirrorReload);
    assert_eq!(f.table.len(), 50);
}

#[test]
fn test_store_growth_detected_after_staleness_window() {
    let mut f = fixture(80);
    f.engine.reconcile();
    assert_eq!(f.table.len(), 80);

    f.store.set_rows(rows(120));
    f.clock.set(T0 + 29_999);
    let still_fresh = f.engine.reconcile();
    assert_eq!(still_fresh.action, ReconcileAction::MirrorReload);
    assert_eq!(f.table.len(), 120, "fresh estimate still believes the store fits");

    f.clock.set(T0 + 30_000);
    let remeasured = f.engine.reconcile();
    assert_eq!(remeasured.measured, Some(120));
    assert_eq!(remeasured.action, ReconcileAction::PruneOnly);

    f.clock.set(T0 + 31_000);
    f.engine.reconcile();
    assert!(f.table.rows().iter().all(|r| T0 + 31_000 - r.loaded_at <= 1_000));
}

#[test]
fn test_persisted_estimate_skips_initial_measurement() {
    let store = Arc::new(MemoryStore::new(schema(), rows(500)));
    store.set_size_metadata(SizeMetadata {
        estimated_size: 500,
        last_checked: T0 - 1_000,
    });
    let table = Arc::new(InMemoryCacheTable::new(&schema()));
    let mut engine = ReconciliationEngine::new(
        CacheConfig::new(Duration::from_millis(1_000), 100),
        store.clone(),
        table,
        Arc::new(ManualClock::new(T0)),
    )
    .unwrap();

    let outcome = engine.reconcile();
    assert_eq!(outcome.action, ReconcileAction::PruneOnly);
    assert_eq!(store.query_count(), 0);
}

#[test]
fn test_schema_binding_failure_aborts_construction() {
    let bad = schema().attribute("loaded_at", AttributeKind::Long);
    let result = ReconciliationEngine::new(
        CacheConfig::new(Duration::from_millis(1_000), 100),
        Arc::new(MemoryStore::new(bad, Vec::new())),
        Arc::new(InMemoryCacheTable::new(&schema())),
        Arc::new(ManualClock::new(T0)),
    );
    assert!(matches!(result, Err(CacheError::SchemaBinding(_))));
}

#[test]
fn test_zero_capacity_is_prune_only() {
    let store = Arc::new(MemoryStore::new(schema(), rows(5)));
    let table = Arc::new(InMemoryCacheTable::new(&schema()));
    let mut engine = ReconciliationEngine::new(
        CacheConfig::new(Duration::from_millis(1_000), 0),
        store,
        table.clone(),
        Arc::new(ManualClock::new(T0)),
    )
    .unwrap();

    let outcome = engine.reconcile();
    assert_eq!(outcome.action, ReconcileAction::PruneOnly);
    assert_eq!(outcome.measured, Some(5));
    assert!(table.is_empty());
}
