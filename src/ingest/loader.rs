//! IngestPipeline - detections.json → DetectionStore
//!
//! Flow for one `load`:
//! 1. Read the file (missing file is fatal)
//! 2. Parse the `{"detections": [...]}` envelope (wrong shape is fatal)
//! 3. Convert each entry on its own: classify, then encode the three maps
//! 4. Hand every surviving entry to the store in one `insert_all`
//!
//! A bad entry is recorded in `ImportResult::failures` and skipped; it never
//! aborts the batch.

use super::classify::classify;
use super::codec;
use super::types::{NewDetection, RawDetectionEntry};
use crate::store::{DetectionStore, StoreError};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Classification run when none is configured
pub const DEFAULT_ANALYSIS_KIND: &str = "vehicle";

/// Errors that abort a whole `load`
#[derive(Debug)]
pub enum IngestError {
    /// Missing, not a regular file, or not readable
    FileNotFound(PathBuf),
    MalformedDocument(String),
    Persistence(StoreError),
}

impl From<StoreError> for IngestError {
    fn from(err: StoreError) -> Self {
        IngestError::Persistence(err)
    }
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestError::FileNotFound(path) => write!(f, "File not found: {}", path.display()),
            IngestError::MalformedDocument(msg) => write!(f, "Malformed document: {}", msg),
            IngestError::Persistence(e) => write!(f, "Persistence failure: {}", e),
        }
    }
}

impl std::error::Error for IngestError {}

/// Why a single entry was dropped
#[derive(Debug, Clone, PartialEq)]
pub enum EntryConversionError {
    /// Entry is not an object of the expected field types
    Shape(String),
    MissingTimestamp,
}

impl std::fmt::Display for EntryConversionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryConversionError::Shape(msg) => write!(f, "Invalid entry: {}", msg),
            EntryConversionError::MissingTimestamp => write!(f, "Missing timestamp_ms"),
        }
    }
}

impl std::error::Error for EntryConversionError {}

/// A dropped entry, identified by its position and (when readable) timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct EntryFailure {
    pub index: usize,
    pub timestamp_ms: Option<i64>,
    pub error: EntryConversionError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStatus {
    /// At least one entry was persisted
    Imported,
    /// The detection list was empty
    NoData,
    /// Entries were present but none survived conversion
    AllFailed,
}

/// Outcome of a non-fatal `load`
#[derive(Debug, Clone, PartialEq)]
pub struct ImportResult {
    pub source: PathBuf,
    pub total_entries: usize,
    pub persisted: usize,
    pub failures: Vec<EntryFailure>,
    pub status: ImportStatus,
}

impl ImportResult {
    pub fn no_data(&self) -> bool {
        self.status == ImportStatus::NoData
    }

    pub fn all_failed(&self) -> bool {
        self.status == ImportStatus::AllFailed
    }
}

/// Envelope of the ingest file; entries stay untyped until converted
#[derive(Debug, Deserialize)]
struct DetectionsDocument {
    detections: Vec<serde_json::Value>,
}

pub struct IngestPipeline {
    store: Arc<dyn DetectionStore>,
    analysis_kind: String,
}

impl IngestPipeline {
    pub fn new(store: Arc<dyn DetectionStore>) -> Self {
        Self {
            store,
            analysis_kind: DEFAULT_ANALYSIS_KIND.to_string(),
        }
    }

    /// Select the classification pass run on each entry
    pub fn with_analysis_kind(mut self, kind: impl Into<String>) -> Self {
        self.analysis_kind = kind.into();
        self
    }

    pub fn analysis_kind(&self) -> &str {
        &self.analysis_kind
    }

    /// Import one detections file into the store
    ///
    /// Returns `Err` only for file access, document shape and persistence
    /// failures. Per-entry problems are reported in the `ImportResult`.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<ImportResult, IngestError> {
        let path = path.as_ref();
        log::info!("📥 Reading detections from {}", path.display());

        // Invalid UTF-8 is rejected by the JSON parser as a malformed document
        let bytes = read_detections_file(path)?;
        let document: DetectionsDocument = serde_json::from_slice(&bytes)
            .map_err(|e| IngestError::MalformedDocument(e.to_string()))?;

        let total_entries = document.detections.len();
        if total_entries == 0 {
            log::info!("📭 No detections in {}", path.display());
            return Ok(ImportResult {
                source: path.to_path_buf(),
                total_entries: 0,
                persisted: 0,
                failures: Vec::new(),
                status: ImportStatus::NoData,
            });
        }

        let mut detections = Vec::with_capacity(total_entries);
        let mut failures = Vec::new();

        for (index, value) in document.detections.into_iter().enumerate() {
            let timestamp_ms = value.get("timestamp_ms").and_then(|v| v.as_i64());

            match convert_entry(value, &self.analysis_kind) {
                Ok(detection) => detections.push(detection),
                Err(error) => {
                    log::warn!(
                        "⚠️  Skipping detection #{} (timestamp_ms: {:?}): {}",
                        index,
                        timestamp_ms,
                        error
                    );
                    failures.push(EntryFailure {
                        index,
                        timestamp_ms,
                        error,
                    });
                }
            }
        }

        if detections.is_empty() {
            log::warn!(
                "⚠️  All {} detections in {} failed conversion",
                total_entries,
                path.display()
            );
            return Ok(ImportResult {
                source: path.to_path_buf(),
                total_entries,
                persisted: 0,
                failures,
                status: ImportStatus::AllFailed,
            });
        }

        let persisted = self.store.insert_all(detections)?;

        log::info!(
            "✅ Imported {}/{} detections from {} ({} skipped)",
            persisted,
            total_entries,
            path.display(),
            failures.len()
        );

        Ok(ImportResult {
            source: path.to_path_buf(),
            total_entries,
            persisted,
            failures,
            status: ImportStatus::Imported,
        })
    }
}

fn read_detections_file(path: &Path) -> Result<Vec<u8>, IngestError> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound(path.to_path_buf()));
    }

    fs::read(path).map_err(|e| {
        log::debug!("Cannot read {}: {}", path.display(), e);
        IngestError::FileNotFound(path.to_path_buf())
    })
}

/// Build one pending record from a raw JSON entry
///
/// Classification runs first and is observational only: its failures are
/// logged and never drop the entry.
pub fn convert_entry(
    value: serde_json::Value,
    analysis_kind: &str,
) -> Result<NewDetection, EntryConversionError> {
    let entry: RawDetectionEntry = serde_json::from_value(value)
        .map_err(|e| EntryConversionError::Shape(e.to_string()))?;

    match classify(analysis_kind, &entry) {
        Ok(Some(outcome)) => log::debug!("📊 Classification: {:?}", outcome),
        Ok(None) => {}
        Err(e) => log::warn!(
            "⚠️  Classification failed for timestamp_ms {:?}: {}",
            entry.timestamp_ms,
            e
        ),
    }

    let timestamp_ms = entry
        .timestamp_ms
        .ok_or(EntryConversionError::MissingTimestamp)?;

    Ok(NewDetection {
        timestamp_ms,
        date: entry.date.clone(),
        objects_total: codec::encode(entry.objects_total.as_ref()),
        objects_by_lane: codec::encode(entry.objects_by_lane.as_ref()),
        avg_speed_by_lane: codec::encode(entry.avg_speed_by_lane.as_ref()),
    })
}
