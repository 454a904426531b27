//! TrafficFlow - traffic detection ingest and aggregation
//!
//! A detector writes `detections.json`; the ingest pipeline converts each
//! entry into a detection record and persists it; the analysis engine turns
//! the stored records into dashboard datasets.
//!
//! ```text
//! detections.json → ingest::IngestPipeline → store::DetectionStore
//!                                                 ↓
//!                                  analysis::DetectionAnalysis
//! ```

pub mod analysis;
pub mod config;
pub mod ingest;
pub mod sqlite_pragma;
pub mod store;

pub use analysis::DetectionAnalysis;
pub use config::TrafficConfig;
pub use ingest::{ImportResult, ImportStatus, IngestError, IngestPipeline, ReloadTrigger};
pub use store::{DetectionStore, InMemoryDetectionStore, SqliteDetectionStore, StoreError};
