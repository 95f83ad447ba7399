//! Store methods for cyber-scam and voice-phishing statistics.

use super::{now_stamp, IngestStore};
use crate::{
    error::IngestResult,
    sources::{cyber::CyberScamRecord, voice::VoicePhishingRecord},
    types::Year,
};
use rusqlite::{params, OptionalExtension, Row};

fn cyber_from_row(row: &Row<'_>) -> rusqlite::Result<CyberScamRecord> {
    Ok(CyberScamRecord {
        year:          row.get(0)?,
        category:      row.get(1)?,
        direct_trade:  row.get(2)?,
        shopping_mall: row.get(3)?,
        game:          row.get(4)?,
        email_trade:   row.get(5)?,
        romance:       row.get(6)?,
        investment:    row.get(7)?,
        etc:           row.get(8)?,
    })
}

impl IngestStore {
    // ── Cyber scam ─────────────────────────────────────────────

    pub fn upsert_cyber_scam(&self, record: &CyberScamRecord) -> IngestResult<()> {
        self.conn.execute(
            "INSERT INTO cyber_scam_stat (
                year, category, direct_trade, shopping_mall, game,
                email_trade, romance, investment, etc, updated_at
            ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)
            ON CONFLICT(year, category) DO UPDATE SET
                direct_trade  = excluded.direct_trade,
                shopping_mall = excluded.shopping_mall,
                game          = excluded.game,
                email_trade   = excluded.email_trade,
                romance       = excluded.romance,
                investment    = excluded.investment,
                etc           = excluded.etc,
                updated_at    = excluded.updated_at",
            params![
                record.year,
                record.category,
                record.direct_trade,
                record.shopping_mall,
                record.game,
                record.email_trade,
                record.romance,
                record.investment,
                record.etc,
                now_stamp(),
            ],
        )?;
        Ok(())
    }

    pub fn cyber_scam_stats(&self) -> IngestResult<Vec<CyberScamRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT year, category, direct_trade, shopping_mall, game,
                    email_trade, romance, investment, etc
             FROM cyber_scam_stat
             ORDER BY year ASC, category ASC",
        )?;
        let rows = stmt.query_map([], cyber_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Sum of all seven counters for one `(year, category)`, if stored.
    pub fn cyber_total_cases(&self, year: Year, category: &str) -> IngestResult<Option<i64>> {
        let record = self.conn.query_row(
            "SELECT year, category, direct_trade, shopping_mall, game,
                    email_trade, romance, investment, etc
             FROM cyber_scam_stat WHERE year = ?1 AND category = ?2",
            params![year, category],
            cyber_from_row,
        ).optional()?;
        Ok(record.map(|r| r.total_cases()))
    }

    pub fn cyber_scam_count(&self) -> IngestResult<i64> {
        self.count("cyber_scam_stat")
    }

    // ── Voice phishing ─────────────────────────────────────────

    pub fn upsert_voice_phishing(&self, record: &VoicePhishingRecord) -> IngestResult<()> {
        self.conn.execute(
            "INSERT INTO voice_phishing_stat (year, month, cases, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(year, month) DO UPDATE SET
                cases      = excluded.cases,
                updated_at = excluded.updated_at",
            params![record.year, record.month, record.cases, now_stamp()],
        )?;
        Ok(())
    }

    pub fn voice_phishing_stats(&self) -> IngestResult<Vec<VoicePhishingRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT year, month, cases FROM voice_phishing_stat
             ORDER BY year ASC, month ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(VoicePhishingRecord {
                year:  row.get(0)?,
                month: row.get(1)?,
                cases: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn voice_phishing_count(&self) -> IngestResult<i64> {
        self.count("voice_phishing_stat")
    }
}
