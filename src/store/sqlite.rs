//! SQLite-backed detection store
//!
//! One connection behind a mutex. Batches are written inside a single
//! transaction so a failed import leaves nothing behind.

use super::{DetectionStore, StoreError};
use crate::ingest::types::{DetectionRecord, NewDetection};
use crate::sqlite_pragma::apply_optimized_pragmas;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Schema applied on every open (all statements are IF NOT EXISTS)
const SCHEMA: &str = include_str!("../../sql/01_detections.sql");

pub struct SqliteDetectionStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDetectionStore {
    /// Open (or create) the database at `db_path` and ensure the schema exists
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path)?;
        apply_optimized_pragmas(&conn)?;
        conn.execute_batch(SCHEMA)?;

        log::info!("📦 Detection store ready: {}", db_path.display());
        Ok(Self::from_connection(conn))
    }

    /// Private in-memory database (tests, one-shot reports)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }
}

impl DetectionStore for SqliteDetectionStore {
    fn insert_all(&self, detections: Vec<NewDetection>) -> Result<usize, StoreError> {
        let mut conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let imported_at = chrono::Utc::now().timestamp();

        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO detections (
                    timestamp_ms, date, objects_total, objects_by_lane,
                    avg_speed_by_lane, imported_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;

            for detection in &detections {
                stmt.execute(params![
                    detection.timestamp_ms,
                    detection.date,
                    detection.objects_total,
                    detection.objects_by_lane,
                    detection.avg_speed_by_lane,
                    imported_at,
                ])?;
            }
        }
        tx.commit()?;

        log::debug!("💾 Inserted {} detections", detections.len());
        Ok(detections.len())
    }

    fn find_all(&self) -> Result<Vec<DetectionRecord>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let mut stmt = conn.prepare(
            "SELECT id, timestamp_ms, date, objects_total, objects_by_lane, avg_speed_by_lane
             FROM detections
             ORDER BY id ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(DetectionRecord {
                id: row.get(0)?,
                timestamp_ms: row.get(1)?,
                date: row.get(2)?,
                objects_total: row.get(3)?,
                objects_by_lane: row.get(4)?,
                avg_speed_by_lane: row.get(5)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    fn count(&self) -> Result<u64, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM detections", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    fn backend_type(&self) -> &'static str {
        "sqlite"
    }
}
