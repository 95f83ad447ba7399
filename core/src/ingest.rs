//! Sync orchestration: fetch → normalize → upsert, one source at a time.
//!
//! Each upsert is its own statement. A failure partway through a batch
//! leaves earlier rows committed and returns the error; re-running the sync
//! is always safe because every write is keyed on the natural key.

use crate::{
    aggregate::{summarize, DepartureTotals},
    config::IngestConfig,
    error::IngestResult,
    http::HttpTransport,
    outcome::{BatchOutcome, SyncReport},
    sources::{
        cyber::{self, CyberScamRecord},
        travel::{self, TravelRecord},
        travel_csv::{self, csv_country_key, DepartureRow},
        voice::{self, RawObject, VoicePhishingRecord},
    },
    store::{now_stamp, IngestStore, SyncRunRow},
    types::{Direction, Month, Source, Year},
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Result of a CSV bulk load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CsvSyncSummary {
    /// Upserts executed (one per aggregated row).
    pub saved_rows:      usize,
    /// Rows in the travel table after the load.
    pub total_rows:      i64,
    pub year_totals:     BTreeMap<Year, i64>,
    pub crime_totals:    BTreeMap<Year, i64>,
    pub total_all_years: i64,
    pub report:          SyncReport,
}

pub struct Ingestor<'a> {
    config:    &'a IngestConfig,
    transport: &'a dyn HttpTransport,
    store:     &'a IngestStore,
}

impl<'a> Ingestor<'a> {
    pub fn new(
        config:    &'a IngestConfig,
        transport: &'a dyn HttpTransport,
        store:     &'a IngestStore,
    ) -> Self {
        Self { config, transport, store }
    }

    // ── Cyber scam ─────────────────────────────────────────────

    /// Raw rows of one API page, not persisted.
    pub fn fetch_cyber_scam(&self, page: u32, per_page: u32) -> IngestResult<Vec<serde_json::Value>> {
        cyber::fetch_cyber_scam(self.transport, self.config, page, per_page)
    }

    pub fn sync_cyber_scam(&self) -> IngestResult<SyncReport> {
        let started_at = now_stamp();
        let rows = self.fetch_cyber_scam(1, self.config.cyber_per_page)?;
        let outcome = cyber::normalize_cyber_rows(&rows);
        for record in &outcome.accepted {
            self.store.upsert_cyber_scam(record)?;
        }
        self.finish(Source::CyberScam, &outcome, started_at)
    }

    /// Normalized cyber-scam records of one page, not persisted.
    pub fn preview_cyber_scam(&self, page: u32, per_page: u32) -> IngestResult<BatchOutcome<CyberScamRecord>> {
        let rows = self.fetch_cyber_scam(page, per_page)?;
        Ok(cyber::normalize_cyber_rows(&rows))
    }

    // ── Voice phishing ─────────────────────────────────────────

    /// Decoded row objects of one API page, not persisted.
    pub fn fetch_voice_phishing(&self, page: u32, per_page: u32) -> IngestResult<BatchOutcome<RawObject>> {
        voice::fetch_voice_phishing(self.transport, self.config, page, per_page)
    }

    pub fn sync_voice_phishing(&self) -> IngestResult<SyncReport> {
        let started_at = now_stamp();
        let decoded = self.fetch_voice_phishing(1, self.config.voice_per_page)?;
        let outcome: BatchOutcome<VoicePhishingRecord> = voice::normalize_decoded(decoded);
        for record in &outcome.accepted {
            self.store.upsert_voice_phishing(record)?;
        }
        self.finish(Source::VoicePhishing, &outcome, started_at)
    }

    // ── Travel (live API) ──────────────────────────────────────

    /// The raw API item for one query, or `None` when there is no data.
    pub fn fetch_travel_stats(
        &self,
        year_month:   &str,
        country_code: &str,
        direction:    Direction,
    ) -> IngestResult<Option<serde_json::Value>> {
        travel::fetch_travel_stats(self.transport, self.config, year_month, country_code, direction)
    }

    pub fn sync_travel_stats(
        &self,
        year:         Year,
        month:        Month,
        country_code: &str,
        direction:    Direction,
    ) -> IngestResult<SyncReport> {
        let started_at = now_stamp();
        let ym = travel::year_month(year, month)?;
        let mut outcome: BatchOutcome<TravelRecord> = BatchOutcome::default();
        match self.fetch_travel_stats(&ym, country_code, direction)? {
            Some(item) => {
                let record = travel::normalize_travel_item(&item, year, month, country_code, direction);
                self.store.upsert_travel(&record)?;
                outcome.accepted.push(record);
            }
            None => log::info!("travel {ym} {country_code}/{direction}: no data"),
        }
        self.finish(Source::TravelApi, &outcome, started_at)
    }

    // ── Travel (CSV bulk) ──────────────────────────────────────

    /// Long-format rows from every configured region file, not persisted.
    /// Wide files come back as annual rows (`month = 0`).
    pub fn load_travel_csv(&self) -> IngestResult<BatchOutcome<DepartureRow>> {
        travel_csv::load_region_files(&self.config.csv_files, self.config.csv_layout)
    }

    pub fn sync_travel_csv(&self) -> IngestResult<CsvSyncSummary> {
        let started_at = now_stamp();
        let loaded = self.load_travel_csv()?;

        let mut saved_rows = 0usize;
        for row in &loaded.accepted {
            self.store.upsert_travel(&TravelRecord {
                year:         row.year,
                month:        row.month,
                country:      csv_country_key(&row.region, &row.country),
                direction:    Direction::Outbound,
                departures:   row.departures,
                region:       Some(row.region.clone()),
                country_name: Some(row.country.clone()),
                ratio:        None,
            })?;
            saved_rows += 1;
        }

        let DepartureTotals { year_totals, crime_totals, total_all_years } =
            summarize(&loaded.accepted, &self.config.crime_countries);
        log::info!(
            "travel csv: saved {saved_rows} rows, {} years, all-years total {total_all_years}",
            year_totals.len()
        );

        let report = self.finish(Source::TravelCsv, &loaded, started_at)?;
        Ok(CsvSyncSummary {
            saved_rows,
            total_rows: self.store.travel_count()?,
            year_totals,
            crime_totals,
            total_all_years,
            report,
        })
    }

    fn finish<T>(
        &self,
        source:     Source,
        outcome:    &BatchOutcome<T>,
        started_at: String,
    ) -> IngestResult<SyncReport> {
        let report = SyncReport::new(uuid::Uuid::new_v4().to_string(), source, outcome);
        self.store.insert_sync_run(&SyncRunRow {
            run_id:      report.run_id.clone(),
            source:      source.as_str().to_string(),
            accepted:    report.accepted as i64,
            skipped:     report.skipped as i64,
            started_at,
            finished_at: now_stamp(),
        })?;
        log::info!(
            "{source} sync {}: accepted={} skipped={} {:?}",
            report.run_id, report.accepted, report.skipped, report.reasons
        );
        Ok(report)
    }
}
