//! Reload trigger and debounced file watcher
//!
//! The watcher polls the detections file's metadata. A change marks a
//! pending reload; the reload only fires once the file has been quiet for
//! the debounce delay, so a detector rewriting the file in several steps
//! causes one import, not several.

use super::loader::{ImportResult, IngestError, IngestPipeline};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};
use tokio::time::{interval, sleep, MissedTickBehavior};

/// Anything that can re-import a detections file
pub trait ReloadTrigger: Send + Sync {
    fn reload(&self, path: &Path) -> Result<ImportResult, IngestError>;
}

impl ReloadTrigger for IngestPipeline {
    fn reload(&self, path: &Path) -> Result<ImportResult, IngestError> {
        self.load(path)
    }
}

/// Pending-reload state: only the newest change event counts
#[derive(Debug, Clone)]
pub struct ReloadDebouncer {
    delay: Duration,
    pending_since: Option<Instant>,
}

impl ReloadDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending_since: None,
        }
    }

    /// Record a change event, superseding any earlier pending one
    pub fn notify(&mut self, now: Instant) {
        self.pending_since = Some(now);
    }

    /// True exactly once, when the newest event is at least `delay` old
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.pending_since {
            Some(since) if now.saturating_duration_since(since) >= self.delay => {
                self.pending_since = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }
}

/// Size + mtime snapshot used to detect creation and modification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileFingerprint {
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl FileFingerprint {
    /// `None` when the file is missing, unreadable or empty
    pub fn read(path: &Path) -> Option<Self> {
        let metadata = fs::metadata(path).ok()?;
        if !metadata.is_file() || metadata.len() == 0 {
            return None;
        }

        Some(Self {
            len: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub poll_interval: Duration,
    pub debounce: Duration,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(2_000),
            debounce: Duration::from_millis(1_000),
        }
    }
}

/// Log the outcome of an import at the appropriate level
///
/// `path` is only used when the import failed; successful outcomes report
/// their own `source`.
pub fn log_import_outcome(path: &Path, outcome: &Result<ImportResult, IngestError>) {
    match outcome {
        Ok(result) if result.no_data() => {
            log::info!("📭 {} contains no detections", result.source.display());
        }
        Ok(result) if result.all_failed() => {
            log::warn!(
                "⚠️  {}: none of {} detections could be converted",
                result.source.display(),
                result.total_entries
            );
        }
        Ok(result) => {
            log::info!(
                "✅ {}: {} persisted, {} skipped",
                result.source.display(),
                result.persisted,
                result.failures.len()
            );
        }
        Err(e) => {
            log::error!("❌ Failed to import {}: {}", path.display(), e);
        }
    }
}

/// Import the file once at startup if it exists and is non-empty
pub fn initial_import(trigger: &dyn ReloadTrigger, path: &Path) -> Option<ImportResult> {
    if FileFingerprint::read(path).is_none() {
        log::info!("📂 No initial detections at {}", path.display());
        return None;
    }

    log::info!("📂 Loading initial detections from {}", path.display());
    let outcome = trigger.reload(path);
    log_import_outcome(path, &outcome);
    outcome.ok()
}

/// Watch `path` and re-import it after each burst of changes
///
/// Runs until the task is aborted. Reload errors are logged and never stop
/// the watcher. The current state of the file at startup is taken as the
/// baseline (see `initial_import`).
pub async fn watch_detections_file(
    path: PathBuf,
    trigger: Arc<dyn ReloadTrigger>,
    config: WatchConfig,
) {
    log::info!(
        "🔍 Watching {} (poll: {}ms, debounce: {}ms)",
        path.display(),
        config.poll_interval.as_millis(),
        config.debounce.as_millis()
    );

    let mut debouncer = ReloadDebouncer::new(config.debounce);
    let mut last_seen = FileFingerprint::read(&path);
    let mut ticker = interval(config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let now = Instant::now();

        let current = FileFingerprint::read(&path);
        if current.is_some() && current != last_seen {
            log::info!("📝 {} changed", path.display());
            debouncer.notify(now);
        }
        last_seen = current;

        if !debouncer.poll(now) {
            continue;
        }

        if current.is_none() {
            log::warn!("⚠️  {} is no longer available, skipping reload", path.display());
            continue;
        }

        let reload_trigger = trigger.clone();
        let reload_path = path.clone();
        match tokio::task::spawn_blocking(move || reload_trigger.reload(&reload_path)).await {
            Ok(outcome) => log_import_outcome(&path, &outcome),
            Err(e) => log::error!("❌ Reload task failed: {}", e),
        }
    }
}

/// Wait `start_delay`, import once, then watch
pub async fn run_watcher(
    path: PathBuf,
    trigger: Arc<dyn ReloadTrigger>,
    config: WatchConfig,
    start_delay: Duration,
) {
    sleep(start_delay).await;

    let initial_trigger = trigger.clone();
    let initial_path = path.clone();
    if let Err(e) =
        tokio::task::spawn_blocking(move || initial_import(&*initial_trigger, &initial_path)).await
    {
        log::error!("❌ Initial import task failed: {}", e);
    }

    watch_detections_file(path, trigger, config).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DetectionStore, InMemoryDetectionStore};
    use tempfile::tempdir;

    const TWO_DETECTIONS: &str = r#"{"detections": [
        {"timestamp_ms": 1, "date": "2025-05-01 08:00:00", "objects_total": {"car": 1}},
        {"timestamp_ms": 2, "date": "2025-05-01 08:01:00", "objects_total": {"bus": 1}}
    ]}"#;

    #[test]
    fn test_debouncer_fires_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = ReloadDebouncer::new(Duration::from_millis(1000));

        debouncer.notify(start);
        assert!(!debouncer.poll(start + Duration::from_millis(500)));
        assert!(debouncer.poll(start + Duration::from_millis(1000)));

        // Fires once per burst
        assert!(!debouncer.poll(start + Duration::from_millis(3000)));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_newer_event_supersedes_older() {
        let start = Instant::now();
        let mut debouncer = ReloadDebouncer::new(Duration::from_millis(1000));

        debouncer.notify(start);
        debouncer.notify(start + Duration::from_millis(800));

        // 1000ms after the first event, but only 200ms after the newest
        assert!(!debouncer.poll(start + Duration::from_millis(1000)));
        assert!(debouncer.poll(start + Duration::from_millis(1800)));
    }

    #[test]
    fn test_fingerprint_ignores_missing_and_empty_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("detections.json");
        assert_eq!(FileFingerprint::read(&path), None);

        fs::write(&path, "").unwrap();
        assert_eq!(FileFingerprint::read(&path), None);

        fs::write(&path, TWO_DETECTIONS).unwrap();
        let fingerprint = FileFingerprint::read(&path).unwrap();
        assert_eq!(fingerprint.len, TWO_DETECTIONS.len() as u64);
    }

    #[test]
    fn test_initial_import_skips_missing_file() {
        let dir = tempdir().unwrap();
        let store = Arc::new(InMemoryDetectionStore::new());
        let pipeline = IngestPipeline::new(store.clone());

        let result = initial_import(&pipeline, &dir.path().join("detections.json"));
        assert!(result.is_none());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_initial_import_loads_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("detections.json");
        fs::write(&path, TWO_DETECTIONS).unwrap();

        let store = Arc::new(InMemoryDetectionStore::new());
        let pipeline = IngestPipeline::new(store.clone());

        let result = initial_import(&pipeline, &path).unwrap();
        assert_eq!(result.source, path);
        assert_eq!(result.persisted, 2);
        assert_eq!(store.count().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_watcher_imports_created_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("detections.json");

        let store = Arc::new(InMemoryDetectionStore::new());
        let trigger: Arc<dyn ReloadTrigger> = Arc::new(IngestPipeline::new(store.clone()));
        let config = WatchConfig {
            poll_interval: Duration::from_millis(20),
            debounce: Duration::from_millis(60),
        };

        let handle = tokio::spawn(watch_detections_file(path.clone(), trigger, config));

        // Let the watcher take its (empty) baseline first
        sleep(Duration::from_millis(50)).await;
        fs::write(&path, TWO_DETECTIONS).unwrap();

        let mut imported = 0;
        for _ in 0..50 {
            sleep(Duration::from_millis(20)).await;
            imported = store.count().unwrap();
            if imported > 0 {
                break;
            }
        }

        handle.abort();
        assert_eq!(imported, 2);
    }
}
