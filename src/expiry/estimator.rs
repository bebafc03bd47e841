//! Store Size Estimator Module
//!
//! Remembers the last measured backing-store size and whether it can still be trusted.

use std::time::Duration;

use serde::Serialize;

use crate::clock::{duration_ms, Timestamp};
use crate::store::SizeMetadata;

// == Size Estimate ==
/// Last measured row count of the backing store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SizeEstimate {
    /// `None` means unknown; the next cycle must measure
    pub row_count: Option<u64>,
    /// Only meaningful when `row_count` is `Some`
    pub measured_at: Option<Timestamp>,
}

impl SizeEstimate {
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Normalizes the store's raw size fields; any negative size is unknown.
    pub fn from_raw(raw_size: i64, last_checked: Timestamp) -> Self {
        match u64::try_from(raw_size) {
            Ok(count) => Self {
                row_count: Some(count),
                measured_at: Some(last_checked),
            },
            Err(_) => Self::unknown(),
        }
    }

    /// Raw form written back to the store.
    pub fn to_metadata(self) -> SizeMetadata {
        match (self.row_count, self.measured_at) {
            (Some(count), Some(at)) => SizeMetadata {
                estimated_size: i64::try_from(count).unwrap_or(i64::MAX),
                last_checked: at,
            },
            _ => SizeMetadata::unknown(),
        }
    }
}

// == Estimator ==
/// Single-writer owner of the size estimate.
#[derive(Debug, Clone)]
pub struct StoreSizeEstimator {
    estimate: SizeEstimate,
    staleness_window: Duration,
}

impl StoreSizeEstimator {
    pub fn new(staleness_window: Duration) -> Self {
        Self::with_estimate(SizeEstimate::unknown(), staleness_window)
    }

    pub fn with_estimate(estimate: SizeEstimate, staleness_window: Duration) -> Self {
        Self {
            estimate,
            staleness_window,
        }
    }

    /// True iff the count is known and `now - measured_at < staleness_window`.
    pub fn is_fresh(&self, now: Timestamp) -> bool {
        match (self.estimate.row_count, self.estimate.measured_at) {
            (Some(_), Some(measured_at)) => {
                now.saturating_sub(measured_at) < duration_ms(self.staleness_window)
            }
            _ => false,
        }
    }

    pub fn record(&mut self, count: u64, now: Timestamp) {
        self.estimate = SizeEstimate {
            row_count: Some(count),
            measured_at: Some(now),
        };
    }

    /// Forgets the estimate so the next cycle measures again.
    pub fn invalidate(&mut self) {
        self.estimate = SizeEstimate::unknown();
    }

    /// `row_count <= max_capacity`; false while the count is unknown.
    pub fn fits_in_cache(&self, max_capacity: u64) -> bool {
        self.estimate
            .row_count
            .is_some_and(|count| count <= max_capacity)
    }

    pub fn estimate(&self) -> SizeEstimate {
        self.estimate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SIZE_STALENESS_WINDOW;

    #[test]
    fn test_unknown_is_never_fresh() {
        let estimator = StoreSizeEstimator::new(SIZE_STALENESS_WINDOW);
        assert!(!estimator.is_fresh(0));
        assert!(!estimator.fits_in_cache(u64::MAX));
    }

    #[test]
    fn test_staleness_boundary() {
        let mut estimator = StoreSizeEstimator::new(SIZE_STALENESS_WINDOW);
        let t0 = 1_000_000;
        estimator.record(10, t0);

        assert!(estimator.is_fresh(t0));
        assert!(estimator.is_fresh(t0 + 29_999));
        assert!(!estimator.is_fresh(t0 + 30_000));
    }

    #[test]
    fn test_capacity_boundary() {
        let mut estimator = StoreSizeEstimator::new(SIZE_STALENESS_WINDOW);
        estimator.record(100, 0);
        assert!(estimator.fits_in_cache(100));

        estimator.record(101, 0);
        assert!(!estimator.fits_in_cache(100));
    }

    #[test]
    fn test_invalidate() {
        let mut estimator = StoreSizeEstimator::new(SIZE_STALENESS_WINDOW);
        estimator.record(5, 10);
        estimator.invalidate();
        assert_eq!(estimator.estimate(), SizeEstimate::unknown());
        assert!(!estimator.is_fresh(10));
    }

    #[test]
    fn test_from_raw_sentinel() {
        assert_eq!(SizeEstimate::from_raw(-1, 500), SizeEstimate::unknown());
        assert_eq!(SizeEstimate::from_raw(i64::MIN, 500), SizeEstimate::unknown());

        let known = SizeEstimate::from_raw(42, 500);
        assert_eq!(known.row_count, Some(42));
        assert_eq!(known.measured_at, Some(500));
    }

    #[test]
    fn test_to_metadata() {
        assert_eq!(SizeEstimate::unknown().to_metadata(), SizeMetadata::unknown());

        let metadata = SizeEstimate::from_raw(7, 99).to_metadata();
        assert_eq!(metadata.estimated_size, 7);
        assert_eq!(metadata.last_checked, 99);
    }
}
