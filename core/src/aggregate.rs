//! Departure totals derived from long-format rows.
//!
//! Nothing here is persisted; the totals are reported back to the caller
//! of a CSV sync. Sums saturate at `i64::MAX` instead of overflowing.

use crate::{sources::travel_csv::DepartureRow, types::Year};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DepartureTotals {
    /// All countries, all regions, per year.
    pub year_totals:     BTreeMap<Year, i64>,
    /// Watch-listed countries only, per year. Years with no watch-listed
    /// rows are absent rather than zero.
    pub crime_totals:    BTreeMap<Year, i64>,
    pub total_all_years: i64,
}

/// Sum monthly rows into one row per (year, region, country), `month = 0`.
/// Output is ordered by year, then region, then country.
pub fn collapse_to_annual(rows: &[DepartureRow]) -> Vec<DepartureRow> {
    let mut sums: BTreeMap<(Year, &str, &str), i64> = BTreeMap::new();
    for row in rows {
        let sum = sums
            .entry((row.year, row.region.as_str(), row.country.as_str()))
            .or_insert(0);
        *sum = sum.saturating_add(row.departures);
    }
    sums.into_iter()
        .map(|((year, region, country), departures)| DepartureRow {
            year,
            month: 0,
            country: country.to_string(),
            region: region.to_string(),
            departures,
        })
        .collect()
}

fn add_to(totals: &mut BTreeMap<Year, i64>, row: &DepartureRow) {
    let total = totals.entry(row.year).or_insert(0);
    *total = total.saturating_add(row.departures);
}

pub fn year_totals(rows: &[DepartureRow]) -> BTreeMap<Year, i64> {
    let mut totals = BTreeMap::new();
    for row in rows {
        add_to(&mut totals, row);
    }
    totals
}

/// Per-year totals restricted to `watchlist` (case-insensitive match).
pub fn watchlist_totals(rows: &[DepartureRow], watchlist: &[String]) -> BTreeMap<Year, i64> {
    let watched: HashSet<String> = watchlist.iter().map(|c| c.trim().to_lowercase()).collect();
    let mut totals = BTreeMap::new();
    for row in rows.iter().filter(|r| watched.contains(&r.country.trim().to_lowercase())) {
        add_to(&mut totals, row);
    }
    totals
}

pub fn summarize(rows: &[DepartureRow], watchlist: &[String]) -> DepartureTotals {
    let year_totals = year_totals(rows);
    let total_all_years = year_totals
        .values()
        .fold(0i64, |acc, total| acc.saturating_add(*total));
    DepartureTotals {
        crime_totals: watchlist_totals(rows, watchlist),
        year_totals,
        total_all_years,
    }
}
