//! SQLite persistence layer.
//!
//! RULE: Only store/ talks to the database.
//! Sources and the ingestor call store methods; they never execute SQL directly.
//!
//! Every data table carries a UNIQUE constraint on its natural key and every
//! write is a single `INSERT ... ON CONFLICT DO UPDATE`, so re-running a sync
//! overwrites in place instead of duplicating rows.

use crate::error::IngestResult;
use rusqlite::Connection;

mod crime;
mod sync_run;
mod travel;

pub use sync_run::SyncRunRow;

pub struct IngestStore {
    conn: Connection,
}

impl IngestStore {
    /// Open (or create) the statistics database at `path`.
    pub fn open(path: &str) -> IngestResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode only for real files; :memory: ignores it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> IngestResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order. Safe to run repeatedly.
    pub fn migrate(&self) -> IngestResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_crime_stats.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/003_travel.sql"))?;
        Ok(())
    }

    fn count(&self, table: &str) -> IngestResult<i64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {table}"),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

/// RFC 3339 timestamp stamped onto every upserted row.
pub(crate) fn now_stamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
