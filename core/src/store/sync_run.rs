//! Store methods for the sync run log.

use super::IngestStore;
use crate::error::IngestResult;
use rusqlite::params;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncRunRow {
    pub run_id:      String,
    pub source:      String,
    pub accepted:    i64,
    pub skipped:     i64,
    pub started_at:  String,
    pub finished_at: String,
}

impl IngestStore {
    pub fn insert_sync_run(&self, run: &SyncRunRow) -> IngestResult<()> {
        self.conn.execute(
            "INSERT INTO sync_run (run_id, source, accepted, skipped, started_at, finished_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                run.run_id,
                run.source,
                run.accepted,
                run.skipped,
                run.started_at,
                run.finished_at,
            ],
        )?;
        Ok(())
    }

    /// Most recent runs first.
    pub fn recent_sync_runs(&self, limit: usize) -> IngestResult<Vec<SyncRunRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT run_id, source, accepted, skipped, started_at, finished_at
             FROM sync_run
             ORDER BY started_at DESC, rowid DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(SyncRunRow {
                run_id:      row.get(0)?,
                source:      row.get(1)?,
                accepted:    row.get(2)?,
                skipped:     row.get(3)?,
                started_at:  row.get(4)?,
                finished_at: row.get(5)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn sync_run_count(&self) -> IngestResult<i64> {
        self.count("sync_run")
    }
}
