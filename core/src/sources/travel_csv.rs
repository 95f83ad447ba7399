//! Per-region departure CSV files.
//!
//! Two layouts are understood:
//!
//! Wide (the statistics portal export):
//! ```text
//! row 0   boilerplate
//! row 1   ,,,중국,,미국,...            country name per column from col 3
//! row 2   ,,,명수,전년대비,명수,...      metric label; only 명수/count kept
//! row 3+  2019년,,,...                 year marker row, no data
//!         ,1월,,1200,3.1,800,...       month data row
//! ```
//! Month rows are summed into one annual row per (year, country).
//!
//! Long: a header `year,month,<country>,<country>...` and one row per month.
//! Country names are lower-cased and duplicate keys keep the first row.

use crate::{
    aggregate::collapse_to_annual,
    coerce::coerce_opt,
    config::CsvLayout,
    error::{IngestError, IngestResult},
    outcome::{BatchOutcome, SkipReason},
    types::{Month, Year},
};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub const YEAR_MARKER:  char = '년';
pub const MONTH_MARKER: char = '월';
pub const COUNT_LABELS: [&str; 2] = ["명수", "count"];

/// First column that can hold country data in the wide layout.
const FIRST_DATA_COL: usize = 3;
/// First row after the three header rows of the wide layout.
const FIRST_DATA_ROW: usize = 3;

/// Long-format departure fact. `month == 0` for annual totals.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DepartureRow {
    pub year:       Year,
    pub month:      Month,
    pub country:    String,
    pub region:     String,
    pub departures: i64,
}

/// Stored `country` key for a CSV row. The region is part of the key so
/// the same country name in two region files stays two rows.
pub fn csv_country_key(region: &str, country: &str) -> String {
    format!("{region}:{country}")
}

fn cell(record: &StringRecord, col: usize) -> &str {
    record.get(col).unwrap_or("").trim()
}

fn digits(text: &str) -> String {
    text.chars().filter(char::is_ascii_digit).collect()
}

/// `(column, country name)` for every column labelled as a head count.
fn country_columns(names: &StringRecord, labels: &StringRecord) -> Vec<(usize, String)> {
    (FIRST_DATA_COL..labels.len().max(names.len()))
        .filter(|&col| {
            let label = cell(labels, col);
            COUNT_LABELS.iter().any(|l| label.eq_ignore_ascii_case(l))
        })
        .filter_map(|col| {
            let name = cell(names, col);
            if name.is_empty() || name.eq_ignore_ascii_case("nan") {
                None
            } else {
                Some((col, name.to_string()))
            }
        })
        .collect()
}

/// Parse a wide-layout table and collapse it to annual totals.
pub fn parse_wide_table<R: Read>(reader: R, region: &str) -> IngestResult<Vec<DepartureRow>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let rows = rdr.records().collect::<Result<Vec<_>, _>>()?;
    if rows.len() <= FIRST_DATA_ROW {
        log::warn!("[{region}] table has no data rows");
        return Ok(Vec::new());
    }

    let countries = country_columns(&rows[1], &rows[2]);
    log::info!("[{region}] detected {} country columns", countries.len());

    let mut monthly = Vec::new();
    let mut current_year: Option<Year> = None;

    for row in &rows[FIRST_DATA_ROW..] {
        let year_cell = cell(row, 0);
        if year_cell.ends_with(YEAR_MARKER) {
            if let Ok(year) = digits(year_cell).parse::<Year>() {
                current_year = Some(year);
            }
            continue;
        }
        let Some(year) = current_year else { continue };

        let month_cell = cell(row, 1);
        if !month_cell.ends_with(MONTH_MARKER) {
            continue;
        }
        let month = digits(month_cell).parse::<Month>().unwrap_or(0);

        for (col, country) in &countries {
            monthly.push(DepartureRow {
                year,
                month,
                country:    country.clone(),
                region:     region.to_string(),
                departures: coerce_opt(row.get(*col)).max(0),
            });
        }
    }

    Ok(collapse_to_annual(&monthly))
}

fn parse_key_cell(
    record: &StringRecord,
    col:    usize,
    field:  &'static str,
    marker: char,
) -> Result<i64, SkipReason> {
    let raw = cell(record, col);
    if raw.is_empty() {
        return Err(SkipReason::MissingField(field));
    }
    raw.trim_end_matches(marker)
        .trim()
        .parse::<i64>()
        .map_err(|_| SkipReason::NotNumeric { field, value: raw.to_string() })
}

/// Parse a long-layout table, keeping monthly granularity.
pub fn parse_long_table<R: Read>(reader: R, region: &str) -> IngestResult<BatchOutcome<DepartureRow>> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();

    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}').trim().eq_ignore_ascii_case(name))
    };
    let year_col = position("year")
        .ok_or_else(|| IngestError::Layout(format!("[{region}] header has no 'year' column")))?;
    let month_col = position("month")
        .ok_or_else(|| IngestError::Layout(format!("[{region}] header has no 'month' column")))?;

    let countries: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(col, name)| *col != year_col && *col != month_col && !name.trim().is_empty())
        .map(|(col, name)| (col, name.trim().to_lowercase()))
        .collect();

    let mut seen: HashSet<(Year, Month, String)> = HashSet::new();
    let mut outcome = BatchOutcome::default();

    for (index, record) in rdr.records().enumerate() {
        let record = record?;
        let year = match parse_key_cell(&record, year_col, "year", YEAR_MARKER)
            .and_then(|y| Year::try_from(y).map_err(|_| SkipReason::NotNumeric {
                field: "year",
                value: y.to_string(),
            })) {
            Ok(year) => year,
            Err(reason) => {
                outcome.skip(index, reason);
                continue;
            }
        };
        let month = match parse_key_cell(&record, month_col, "month", MONTH_MARKER) {
            Ok(m) if (1..=12).contains(&m) => m as Month,
            Ok(m) => {
                outcome.skip(index, SkipReason::MonthOutOfRange(m));
                continue;
            }
            Err(reason) => {
                outcome.skip(index, reason);
                continue;
            }
        };

        for (col, country) in &countries {
            if !seen.insert((year, month, country.clone())) {
                continue;
            }
            outcome.accepted.push(DepartureRow {
                year,
                month,
                country:    country.clone(),
                region:     region.to_string(),
                departures: coerce_opt(record.get(*col)).max(0),
            });
        }
    }

    Ok(outcome)
}

pub fn load_wide_csv(path: &Path, region: &str) -> IngestResult<Vec<DepartureRow>> {
    parse_wide_table(File::open(path)?, region)
}

pub fn load_long_csv(path: &Path, region: &str) -> IngestResult<BatchOutcome<DepartureRow>> {
    parse_long_table(File::open(path)?, region)
}

/// Load every configured region file. Regions with an empty or missing
/// path are skipped with a warning; a file that exists but cannot be
/// read or parsed is an error.
pub fn load_region_files(
    files:  &BTreeMap<String, String>,
    layout: CsvLayout,
) -> IngestResult<BatchOutcome<DepartureRow>> {
    let mut combined = BatchOutcome::default();
    for (region, path) in files {
        let path = Path::new(path.as_str());
        if path.as_os_str().is_empty() || !path.exists() {
            log::warn!("[{region}] no CSV file at '{}', skipping", path.display());
            continue;
        }
        log::info!("[{region}] loading {}", path.display());
        match layout {
            CsvLayout::Wide => combined.accepted.extend(load_wide_csv(path, region)?),
            CsvLayout::Long => {
                let outcome = load_long_csv(path, region)?;
                combined.accepted.extend(outcome.accepted);
                combined.skipped.extend(outcome.skipped);
            }
        }
    }
    Ok(combined)
}
