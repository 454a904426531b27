//! Ingest - detections.json → detection store
//!
//! ```text
//! detections.json
//!     ↓
//! IngestPipeline::load (parse envelope, per-entry convert)
//!     ↓ classify (observational) + codec::encode
//! DetectionStore::insert_all
//! ```
//!
//! The watcher re-runs the same pipeline whenever the file changes.

pub mod classify;
pub mod codec;
pub mod loader;
pub mod sparse;
pub mod types;
pub mod watcher;

pub use classify::{classify, AnalysisKind, Classification};
pub use loader::{EntryFailure, ImportResult, ImportStatus, IngestError, IngestPipeline};
pub use types::{DetectionRecord, LaneCounts, LaneSpeeds, NewDetection, RawDetectionEntry, VehicleCounts};
pub use watcher::{ReloadDebouncer, ReloadTrigger, WatchConfig};
