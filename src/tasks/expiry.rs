//! Cache Expiry Task
//!
//! Background task that periodically reconciles the cache table with the backing store.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::expiry::{ReconcileOutcome, ReconciliationEngine};

/// Runs one reconciliation cycle on the blocking pool.
///
/// The engine mutex serializes cycles, so a cycle never overlaps another one
/// started by the timer or by a manual trigger.
pub async fn run_cycle(
    engine: Arc<Mutex<ReconciliationEngine>>,
) -> Result<ReconcileOutcome, tokio::task::JoinError> {
    tokio::task::spawn_blocking(move || engine.blocking_lock().reconcile()).await
}

/// Spawns a background task that reconciles the cache every `period`.
///
/// Ticks that fall behind are delayed rather than bunched, and each cycle
/// completes before the next tick is awaited.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let engine = Arc::new(Mutex::new(engine));
/// let expiry_handle = spawn_expiry_task(engine.clone(), Duration::from_secs(5));
/// // Later, during shutdown:
/// expiry_handle.abort();
/// ```
pub fn spawn_expiry_task(
    engine: Arc<Mutex<ReconciliationEngine>>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(period_ms = period.as_millis() as u64, "Starting cache expiry task");

        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match run_cycle(engine.clone()).await {
                Ok(outcome) if outcome.rows_added > 0 || outcome.rows_deleted > 0 => {
                    info!(
                        action = ?outcome.action,
                        deleted = outcome.rows_deleted,
                        added = outcome.rows_added,
                        "Cache reconciled"
                    );
                }
                Ok(outcome) => {
                    debug!(action = ?outcome.action, "Cache reconciled, no rows changed");
                }
                Err(err) => {
                    error!(error = %err, "Reconciliation cycle did not complete");
                }
            }
        }
    })
}
