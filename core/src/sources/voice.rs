//! Monthly voice-phishing case counts.
//!
//! The upstream API is inconsistent about its envelope: rows arrive as
//! `{"data": [...]}`, as a bare array, or as an array whose elements are
//! JSON objects serialized a second time into strings. All three decode
//! to the same sequence of objects here.

use super::{describe, field, is_blank};
use crate::{
    coerce::parse_strict,
    config::IngestConfig,
    error::IngestResult,
    http::HttpTransport,
    outcome::{BatchOutcome, SkipReason},
    types::{Month, Year},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const FIELD_YEAR:  &str = "년";
pub const FIELD_MONTH: &str = "월";
pub const FIELD_CASES: &str = "전화금융사기 발생건수";

/// Natural key: `(year, month)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoicePhishingRecord {
    pub year:  Year,
    pub month: Month,
    pub cases: i64,
}

pub type RawObject = Map<String, Value>;

/// GET the voice-phishing API and decode every usable row object.
/// Elements that cannot be decoded are reported in `skipped`.
pub fn fetch_voice_phishing(
    transport: &dyn HttpTransport,
    config:    &IngestConfig,
    page:      u32,
    per_page:  u32,
) -> IngestResult<BatchOutcome<RawObject>> {
    let query = [
        ("page",       page.to_string()),
        ("perPage",    per_page.to_string()),
        ("serviceKey", config.api_key.clone()),
        ("returnType", "JSON".to_string()),
    ];
    let body = transport.get(&config.voice.url(), &query)?;
    decode_voice_body(&body)
}

/// Decode a response body into row objects.
///
/// The top-level document must be JSON (possibly itself wrapped in a JSON
/// string); failure there is a serialization error for the whole call.
pub fn decode_voice_body(body: &str) -> IngestResult<BatchOutcome<RawObject>> {
    let mut doc: Value = serde_json::from_str(body)?;
    if let Value::String(inner) = &doc {
        doc = serde_json::from_str(inner)?;
    }

    let rows = match doc {
        Value::Array(rows) => rows,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(rows)) => rows,
            _ => {
                log::warn!("voice-phishing response carried no data array");
                Vec::new()
            }
        },
        _ => Vec::new(),
    };
    Ok(decode_rows(rows))
}

/// Accept objects as-is, re-parse string elements once, drop the rest.
pub fn decode_rows(rows: Vec<Value>) -> BatchOutcome<RawObject> {
    BatchOutcome::from_rows(rows, decode_row)
}

fn decode_row(row: Value) -> Result<RawObject, SkipReason> {
    match row {
        Value::Object(obj) => Ok(obj),
        Value::String(text) => match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(obj)) => Ok(obj),
            Ok(_) => Err(SkipReason::NotAnObject),
            Err(_) => Err(SkipReason::UndecodableString),
        },
        _ => Err(SkipReason::NotAnObject),
    }
}

pub fn normalize_voice_row(row: &RawObject) -> Result<VoicePhishingRecord, SkipReason> {
    let year_raw = field(row, FIELD_YEAR)
        .filter(|v| !is_blank(v))
        .ok_or(SkipReason::MissingField(FIELD_YEAR))?;
    let month_raw = field(row, FIELD_MONTH)
        .filter(|v| !is_blank(v))
        .ok_or(SkipReason::MissingField(FIELD_MONTH))?;
    // Zero cases is a real value, so only absent/null/"" are rejected here.
    let cases_raw = match field(row, FIELD_CASES) {
        Some(Value::String(s)) if s.is_empty() => None,
        other => other,
    }
    .ok_or(SkipReason::MissingField(FIELD_CASES))?;

    let strict = |name: &'static str, value: &Value| {
        parse_strict(value).ok_or_else(|| SkipReason::NotNumeric {
            field: name,
            value: describe(value),
        })
    };
    let year = strict(FIELD_YEAR, year_raw)?;
    let month = strict(FIELD_MONTH, month_raw)?;
    let cases = strict(FIELD_CASES, cases_raw)?;

    if !(1..=12).contains(&month) {
        return Err(SkipReason::MonthOutOfRange(month));
    }
    let year = Year::try_from(year).map_err(|_| SkipReason::NotNumeric {
        field: FIELD_YEAR,
        value: year.to_string(),
    })?;
    if cases < 0 {
        return Err(SkipReason::NotNumeric { field: FIELD_CASES, value: cases.to_string() });
    }

    Ok(VoicePhishingRecord { year, month: month as Month, cases })
}

pub fn normalize_voice_rows(rows: &[RawObject]) -> BatchOutcome<VoicePhishingRecord> {
    BatchOutcome::from_rows(rows, normalize_voice_row)
}

/// Normalize decoded rows and merge both skip lists, with every skip
/// indexed by its position in the raw upstream array.
pub fn normalize_decoded(decoded: BatchOutcome<RawObject>) -> BatchOutcome<VoicePhishingRecord> {
    let positions = decoded.accepted_positions();
    let mut outcome = normalize_voice_rows(&decoded.accepted);
    for row in &mut outcome.skipped {
        row.index = positions[row.index];
    }
    outcome.skipped.extend(decoded.skipped);
    outcome.skipped.sort_by_key(|row| row.index);
    outcome
}
