//! Shared SQLite connection tuning
//!
//! Applied to every connection the store opens: WAL so readers never block
//! the importer, relaxed fsync, in-memory temp tables, and a busy timeout so
//! a concurrent import waits instead of failing with SQLITE_BUSY.

use rusqlite::Connection;
use std::time::Duration;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Cache size in KiB (negative value = KiB for SQLite)
const CACHE_SIZE_KIB: i64 = -16_000;

pub fn apply_optimized_pragmas(conn: &Connection) -> rusqlite::Result<()> {
    // journal_mode reports the mode actually in effect ("memory" for :memory:)
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "temp_store", "MEMORY")?;
    conn.pragma_update(None, "cache_size", CACHE_SIZE_KIB)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;

    log::debug!("📊 SQLite pragmas applied (journal_mode={})", mode);
    Ok(())
}
