//! Reconciliation Statistics Module
//!
//! Tracks what the reconciliation engine did across cycles.

use serde::Serialize;

use crate::expiry::{ReconcileAction, ReconcileOutcome};

// == Reconcile Stats ==
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileStats {
    /// Cycles run
    pub cycles: u64,
    /// Cycles that replaced the cache with a fresh store snapshot
    pub mirror_reloads: u64,
    /// Cycles that only evicted aged rows
    pub prunes: u64,
    /// Cycles cut short by an unreachable store
    pub store_failures: u64,
    /// Cycles that re-measured the store size
    pub measurements: u64,
    /// Rows inserted by reloads
    pub rows_loaded: u64,
    /// Rows removed by any delete
    pub rows_evicted: u64,
}

impl ReconcileStats {
    // == Constructor ==
    /// Creates a new ReconcileStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Outcome ==
    /// Folds one cycle's outcome into the counters.
    pub fn record(&mut self, outcome: &ReconcileOutcome) {
        self.cycles += 1;
        match outcome.action {
            ReconcileAction::MirrorReload => self.mirror_reloads += 1,
            ReconcileAction::PruneOnly => self.prunes += 1,
            ReconcileAction::StoreUnavailable => self.store_failures += 1,
        }
        if outcome.measured.is_some() {
            self.measurements += 1;
        }
        self.rows_loaded += outcome.rows_added as u64;
        self.rows_evicted += outcome.rows_deleted as u64;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(action: ReconcileAction, measured: Option<u64>) -> ReconcileOutcome {
        ReconcileOutcome {
            now: 0,
            action,
            measured,
            rows_deleted: 2,
            rows_added: 3,
        }
    }

    #[test]
    fn test_stats_new() {
        let stats = ReconcileStats::new();
        assert_eq!(stats.cycles, 0);
        assert_eq!(stats.store_failures, 0);
    }

    #[test]
    fn test_record_counts_actions() {
        let mut stats = ReconcileStats::new();
        stats.record(&outcome(ReconcileAction::MirrorReload, Some(3)));
        stats.record(&outcome(ReconcileAction::PruneOnly, None));
        stats.record(&outcome(ReconcileAction::StoreUnavailable, None));

        assert_eq!(stats.cycles, 3);
        assert_eq!(stats.mirror_reloads, 1);
        assert_eq!(stats.prunes, 1);
        assert_eq!(stats.store_failures, 1);
        assert_eq!(stats.measurements, 1);
        assert_eq!(stats.rows_loaded, 9);
        assert_eq!(stats.rows_evicted, 6);
    }
}
