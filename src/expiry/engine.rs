//! Reconciliation Engine Module
//!
//! Decides each cycle between mirroring the backing store and pruning the cache
//! by age, then applies that decision to the cache table.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::{CacheTable, CachedRow, PredicateBuilder, Row};
use crate::clock::{duration_ms, Clock, Timestamp};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::expiry::{ReconcileStats, SizeEstimate, StoreSizeEstimator};
use crate::store::{BackingStore, SizeMetadata};

// == Outcome ==
/// What a reconciliation cycle ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileAction {
    /// Cache replaced by a fresh store snapshot
    MirrorReload,
    /// Rows older than the expiry window evicted, nothing added
    PruneOnly,
    /// The store query failed and the cache was left untouched
    StoreUnavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileOutcome {
    /// Time the cycle ran at
    pub now: Timestamp,
    pub action: ReconcileAction,
    /// Store size measured by this cycle, if it measured
    pub measured: Option<u64>,
    pub rows_deleted: usize,
    pub rows_added: usize,
}

// == Engine ==
pub struct ReconciliationEngine {
    config: CacheConfig,
    predicates: PredicateBuilder,
    estimator: StoreSizeEstimator,
    store: Arc<dyn BackingStore>,
    table: Arc<dyn CacheTable>,
    clock: Arc<dyn Clock>,
    stats: ReconcileStats,
    last_outcome: Option<ReconcileOutcome>,
}

impl ReconciliationEngine {
    /// Creates an engine over the given store and cache table.
    ///
    /// The store's schema is bound to the expiry predicate here, and the size
    /// estimate is seeded from the store's persisted size metadata.
    ///
    /// # Errors
    /// `SchemaBinding` if the schema cannot be bound. This aborts startup.
    pub fn new(
        config: CacheConfig,
        store: Arc<dyn BackingStore>,
        table: Arc<dyn CacheTable>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let predicates = PredicateBuilder::bind(store.schema())?;

        let metadata = store.size_metadata();
        let estimator = StoreSizeEstimator::with_estimate(
            SizeEstimate::from_raw(metadata.estimated_size, metadata.last_checked),
            config.size_staleness_window,
        );

        if config.max_cache_capacity == 0 {
            warn!(
                table = %predicates.table_id(),
                "max_cache_capacity is 0, only an empty store will be mirrored"
            );
        }

        info!(
            table = %predicates.table_id(),
            expiry_window_ms = duration_ms(config.expiry_window),
            max_cache_capacity = config.max_cache_capacity,
            "Reconciliation engine initialized"
        );

        Ok(Self {
            config,
            predicates,
            estimator,
            store,
            table,
            clock,
            stats: ReconcileStats::new(),
            last_outcome: None,
        })
    }

    // == Reconcile ==
    /// Runs one cycle. Store failures are absorbed and reported in the outcome.
    ///
    /// Callers must not run two cycles concurrently.
    pub fn reconcile(&mut self) -> ReconcileOutcome {
        let now = self.clock.now();

        let outcome = if self.estimator.is_fresh(now) {
            if self.estimator.fits_in_cache(self.config.max_cache_capacity) {
                match self.store.query_full() {
                    Ok(rows) => self.mirror_reload(now, rows, None),
                    Err(err) => {
                        // Treated as an empty snapshot: the previous one is still evicted
                        let rows_deleted = self.evict_snapshot(now);
                        self.store_failed(now, err, rows_deleted)
                    }
                }
            } else {
                self.prune(now, None)
            }
        } else {
            self.measure_then_act(now)
        };

        self.stats.record(&outcome);
        self.last_outcome = Some(outcome.clone());
        outcome
    }

    fn measure_then_act(&mut self, now: Timestamp) -> ReconcileOutcome {
        let rows = match self.store.query_full() {
            Ok(rows) => rows,
            Err(err) => {
                self.estimator.invalidate();
                self.store.set_size_metadata(SizeMetadata::unknown());
                return self.store_failed(now, err, 0);
            }
        };

        let count = rows.len() as u64;
        self.estimator.record(count, now);
        self.store
            .set_size_metadata(self.estimator.estimate().to_metadata());
        debug!(
            row_count = count,
            max_cache_capacity = self.config.max_cache_capacity,
            "Measured backing store size"
        );

        if self.estimator.fits_in_cache(self.config.max_cache_capacity) {
            self.mirror_reload(now, rows, Some(count))
        } else {
            self.prune(now, Some(count))
        }
    }

    /// Evicts the whole previous snapshot, then inserts `rows` stamped with `now`.
    fn mirror_reload(
        &self,
        now: Timestamp,
        rows: Vec<Row>,
        measured: Option<u64>,
    ) -> ReconcileOutcome {
        let rows_deleted = self.evict_snapshot(now);

        let stamped: Vec<CachedRow> = rows
            .into_iter()
            .map(|values| CachedRow::stamped(values, now))
            .collect();
        let rows_added = stamped.len();
        self.table.add(stamped);

        ReconcileOutcome {
            now,
            action: ReconcileAction::MirrorReload,
            measured,
            rows_deleted,
            rows_added,
        }
    }

    /// Deletes with the forward-shifted cutoff `now + expiry_window + grace`,
    /// which selects every row loaded at or before `now`.
    fn evict_snapshot(&self, now: Timestamp) -> usize {
        let cutoff = now
            .saturating_add(duration_ms(self.config.expiry_window))
            .saturating_add(duration_ms(self.config.reload_grace));
        let predicate = self.predicates.compile(cutoff, self.config.expiry_window);
        self.table.delete(&predicate)
    }

    fn prune(&self, now: Timestamp, measured: Option<u64>) -> ReconcileOutcome {
        let predicate = self.predicates.compile(now, self.config.expiry_window);
        let rows_deleted = self.table.delete(&predicate);

        ReconcileOutcome {
            now,
            action: ReconcileAction::PruneOnly,
            measured,
            rows_deleted,
            rows_added: 0,
        }
    }

    fn store_failed(
        &self,
        now: Timestamp,
        err: CacheError,
        rows_deleted: usize,
    ) -> ReconcileOutcome {
        warn!(
            table = %self.predicates.table_id(),
            error = %err,
            rows_deleted,
            "Backing store query failed, nothing loaded this cycle"
        );
        ReconcileOutcome {
            now,
            action: ReconcileAction::StoreUnavailable,
            measured: None,
            rows_deleted,
            rows_added: 0,
        }
    }

    // == Accessors ==
    pub fn estimate(&self) -> SizeEstimate {
        self.estimator.estimate()
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn stats(&self) -> &ReconcileStats {
        &self.stats
    }

    pub fn last_outcome(&self) -> Option<&ReconcileOutcome> {
        self.last_outcome.as_ref()
    }
}
