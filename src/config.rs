//! Configuration Module
//!
//! Engine configuration plus service settings loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;


/// How long a measured store size may be trusted before it is measured again.
pub const SIZE_STALENESS_WINDOW: Duration = Duration::from_secs(30);

/// Margin added to the forward-shifted cutoff when a reload clears the previous snapshot.
pub const DEFAULT_RELOAD_GRACE: Duration = Duration::from_millis(100);

// == Cache Config ==
/// Parameters of the reconciliation engine. Immutable once the engine owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum age a cached row may reach before eviction
    pub expiry_window: Duration,
    /// Largest store size that is mirrored in full
    pub max_cache_capacity: u64,
    /// Freshness window of the store size estimate
    pub size_staleness_window: Duration,
    /// Grace added to the reload cutoff
    pub reload_grace: Duration,
}

impl CacheConfig {
    /// Creates a config with the fixed staleness window and default grace.
    pub fn new(expiry_window: Duration, max_cache_capacity: u64) -> Self {
        Self {
            expiry_window,
            max_cache_capacity,
            size_staleness_window: SIZE_STALENESS_WINDOW,
            reload_grace: DEFAULT_RELOAD_GRACE,
        }
    }

    /// Overrides the reload grace constant.
    pub fn with_reload_grace(mut self, grace: Duration) -> Self {
        self.reload_grace = grace;
        self
    }
}

// == Service Config ==
/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Expiry window in milliseconds
    pub expiry_window_ms: u64,
    /// Maximum number of store rows mirrored in full
    pub max_cache_capacity: u64,
    /// Reconciliation period in milliseconds
    pub reconcile_interval_ms: u64,
    /// HTTP server port
    pub server_port: u16,
    /// JSON file backing the store
    pub store_path: PathBuf,
    /// Capacity of the in-memory error store
    pub error_store_max_entries: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `EXPIRY_WINDOW_MS` - Expiry window (default: 60000)
    /// - `MAX_CACHE_CAPACITY` - Mirror capacity in rows (default: 10000)
    /// - `RECONCILE_INTERVAL_MS` - Reconciliation period (default: 5000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `STORE_PATH` - Backing store file (default: store.json)
    /// - `ERROR_STORE_MAX_ENTRIES` - Error store capacity (default: 1000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            expiry_window_ms: parse_env("EXPIRY_WINDOW_MS").unwrap_or(defaults.expiry_window_ms),
            max_cache_capacity: parse_env("MAX_CACHE_CAPACITY")
                .unwrap_or(defaults.max_cache_capacity),
            reconcile_interval_ms: parse_env("RECONCILE_INTERVAL_MS")
                .unwrap_or(defaults.reconcile_interval_ms),
            server_port: parse_env("SERVER_PORT").unwrap_or(defaults.server_port),
            store_path: env::var("STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.store_path),
            error_store_max_entries: parse_env("ERROR_STORE_MAX_ENTRIES")
                .unwrap_or(defaults.error_store_max_entries),
        }
    }

    /// Builds the engine configuration.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new(
            Duration::from_millis(self.expiry_window_ms),
            self.max_cache_capacity,
        )
    }

    pub fn reconcile_interval(&self) -> Duration {
        Duration::from_millis(self.reconcile_interval_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            expiry_window_ms: 60_000,
            max_cache_capacity: 10_000,
            reconcile_interval_ms: 5_000,
            server_port: 3000,
            store_path: PathBuf::from("store.json"),
            error_store_max_entries: 1000,
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
