//! Per-batch accept/skip accounting.
//!
//! Normalizers never abort a batch on a bad row. Each row resolves to
//! either a typed record or a [`SkipReason`], and the batch keeps both.

use crate::types::Source;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// Why a raw upstream row was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("required field '{0}' is missing or empty")]
    MissingField(&'static str),

    #[error("field '{field}' is not an integer: {value}")]
    NotNumeric { field: &'static str, value: String },

    #[error("month {0} is outside 1..=12")]
    MonthOutOfRange(i64),

    #[error("row is neither an object nor a JSON-encoded object")]
    NotAnObject,

    #[error("string row could not be decoded as JSON")]
    UndecodableString,
}

impl SkipReason {
    /// Stable short label, used as the tally key in [`SyncReport`].
    pub fn label(&self) -> &'static str {
        match self {
            SkipReason::MissingField(_)    => "missing_field",
            SkipReason::NotNumeric { .. }  => "not_numeric",
            SkipReason::MonthOutOfRange(_) => "month_out_of_range",
            SkipReason::NotAnObject        => "not_an_object",
            SkipReason::UndecodableString  => "undecodable_string",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// Position of the row in the upstream batch.
    pub index:  usize,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome<T> {
    pub accepted: Vec<T>,
    pub skipped:  Vec<SkippedRow>,
}

impl<T> Default for BatchOutcome<T> {
    fn default() -> Self {
        Self { accepted: Vec::new(), skipped: Vec::new() }
    }
}

impl<T> BatchOutcome<T> {
    /// Run `normalize` over every row, keeping accepted records in order
    /// and recording the index and reason of every rejected one.
    pub fn from_rows<R, F>(rows: impl IntoIterator<Item = R>, mut normalize: F) -> Self
    where
        F: FnMut(R) -> Result<T, SkipReason>,
    {
        let mut outcome = Self::default();
        for (index, row) in rows.into_iter().enumerate() {
            match normalize(row) {
                Ok(record) => outcome.accepted.push(record),
                Err(reason) => {
                    log::debug!("skipping row {index}: {reason}");
                    outcome.skipped.push(SkippedRow { index, reason });
                }
            }
        }
        outcome
    }

    pub fn skip(&mut self, index: usize, reason: SkipReason) {
        log::debug!("skipping row {index}: {reason}");
        self.skipped.push(SkippedRow { index, reason });
    }

    /// Upstream position of each accepted record, in `accepted` order.
    pub fn accepted_positions(&self) -> Vec<usize> {
        let skipped: HashSet<usize> = self.skipped.iter().map(|s| s.index).collect();
        (0..self.total()).filter(|i| !skipped.contains(i)).collect()
    }

    pub fn total(&self) -> usize {
        self.accepted.len() + self.skipped.len()
    }
}

/// What a single `sync_*` call did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncReport {
    pub run_id:   String,
    pub source:   Source,
    pub accepted: usize,
    pub skipped:  usize,
    /// Skip tallies keyed by [`SkipReason::label`].
    pub reasons:  BTreeMap<&'static str, usize>,
}

impl SyncReport {
    pub fn new<T>(run_id: String, source: Source, outcome: &BatchOutcome<T>) -> Self {
        let mut reasons = BTreeMap::new();
        for row in &outcome.skipped {
            *reasons.entry(row.reason.label()).or_insert(0) += 1;
        }
        Self {
            run_id,
            source,
            accepted: outcome.accepted.len(),
            skipped:  outcome.skipped.len(),
            reasons,
        }
    }
}
