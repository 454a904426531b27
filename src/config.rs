//! Runtime configuration from environment variables

use crate::ingest::watcher::WatchConfig;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the traffic runtime
///
/// Every variable is optional; unparseable values fall back to the default.
#[derive(Debug, Clone)]
pub struct TrafficConfig {
    /// Path to SQLite database file
    pub db_path: PathBuf,

    /// Detections file imported at startup and watched for changes
    pub detections_path: PathBuf,

    /// Classification kind run during ingest ("vehicle", "axle")
    pub analysis_kind: String,

    /// Master enable flag for the file watcher
    pub enable_watcher: bool,

    pub watch_poll_interval_ms: u64,

    /// Quiet period before a reload fires
    pub reload_debounce_ms: u64,

    /// Delay before the first import and watch
    pub watch_start_delay_ms: u64,

    /// Period of the runtime summary log
    pub summary_interval_secs: u64,
}

impl TrafficConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `TRAFFIC_DB_PATH` (default: traffic.db)
    /// - `DETECTIONS_PATH` (default: ../detections/detections.json)
    /// - `ANALYSIS_KIND` (default: vehicle)
    /// - `ENABLE_WATCHER` (default: true)
    /// - `WATCH_POLL_INTERVAL_MS` (default: 2000)
    /// - `RELOAD_DEBOUNCE_MS` (default: 1000)
    /// - `WATCH_START_DELAY_MS` (default: 3000)
    /// - `SUMMARY_INTERVAL_SECS` (default: 60)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parsed = |key: &str| lookup(key).and_then(|s| s.trim().parse().ok());

        Self {
            db_path: lookup("TRAFFIC_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("traffic.db")),

            detections_path: lookup("DETECTIONS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("../detections/detections.json")),

            analysis_kind: lookup("ANALYSIS_KIND")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "vehicle".to_string()),

            enable_watcher: lookup("ENABLE_WATCHER")
                .and_then(|s| s.trim().to_ascii_lowercase().parse().ok())
                .unwrap_or(true),

            watch_poll_interval_ms: parsed("WATCH_POLL_INTERVAL_MS").unwrap_or(2_000),

            reload_debounce_ms: parsed("RELOAD_DEBOUNCE_MS").unwrap_or(1_000),

            watch_start_delay_ms: parsed("WATCH_START_DELAY_MS").unwrap_or(3_000),

            summary_interval_secs: parsed("SUMMARY_INTERVAL_SECS").unwrap_or(60),
        }
    }

    pub fn watch_config(&self) -> WatchConfig {
        WatchConfig {
            poll_interval: Duration::from_millis(self.watch_poll_interval_ms.max(1)),
            debounce: Duration::from_millis(self.reload_debounce_ms),
        }
    }

    pub fn watch_start_delay(&self) -> Duration {
        Duration::from_millis(self.watch_start_delay_ms)
    }

    pub fn summary_interval(&self) -> Duration {
        Duration::from_secs(self.summary_interval_secs.max(1))
    }
}
