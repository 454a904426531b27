//! Detection store - durable collection of detection snapshots
//!
//! The ingest pipeline writes through `insert_all`; the analysis engine reads
//! the full collection through `find_all`. Nothing is updated or deleted.
//!
//! - `sqlite` - rusqlite-backed store (production)
//! - `memory` - Vec-backed store (tests, throwaway reports)

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryDetectionStore;
pub use sqlite::SqliteDetectionStore;

use crate::ingest::types::{DetectionRecord, NewDetection};

#[derive(Debug)]
pub enum StoreError {
    Database(rusqlite::Error),
    Io(std::io::Error),
    /// A previous holder of the connection lock panicked
    Poisoned,
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Database(err)
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Database(e) => write!(f, "Database error: {}", e),
            StoreError::Io(e) => write!(f, "IO error: {}", e),
            StoreError::Poisoned => write!(f, "Store lock poisoned"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Storage backend for detection records
///
/// `insert_all` is all-or-nothing: when it returns `Err`, callers treat the
/// batch as not persisted. `find_all` order is unspecified.
pub trait DetectionStore: Send + Sync {
    /// Persist a batch, returning the number of rows written
    fn insert_all(&self, detections: Vec<NewDetection>) -> Result<usize, StoreError>;

    /// Load every stored record
    fn find_all(&self) -> Result<Vec<DetectionRecord>, StoreError>;

    /// Number of stored records
    fn count(&self) -> Result<u64, StoreError>;

    /// Backend name for logging
    fn backend_type(&self) -> &'static str;
}
