//! Cyber-scam statistics (yearly counts per fraud type).

use super::{describe, field};
use crate::{
    coerce::{coerce_value, parse_strict},
    config::IngestConfig,
    error::IngestResult,
    http::HttpTransport,
    outcome::{BatchOutcome, SkipReason},
    types::Year,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const FIELD_YEAR:          &str = "연도";
pub const FIELD_CATEGORY:      &str = "구분";
pub const FIELD_DIRECT_TRADE:  &str = "직거래";
pub const FIELD_SHOPPING_MALL: &str = "쇼핑몰";
pub const FIELD_GAME:          &str = "게임";
pub const FIELD_EMAIL_TRADE:   &str = "이메일 무역";
pub const FIELD_ROMANCE:       &str = "연예빙자";
pub const FIELD_INVESTMENT:    &str = "사이버투자";
pub const FIELD_ETC:           &str = "사이버사기_기타";

/// One year of cyber-scam counts for a category ("발생건수", "검거건수", ...).
/// Natural key: `(year, category)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CyberScamRecord {
    pub year:          Year,
    pub category:      String,
    pub direct_trade:  i64,
    pub shopping_mall: i64,
    pub game:          i64,
    pub email_trade:   i64,
    pub romance:       i64,
    pub investment:    i64,
    pub etc:           i64,
}

impl CyberScamRecord {
    /// Sum of all seven counters, saturating at `i64::MAX`.
    pub fn total_cases(&self) -> i64 {
        [
            self.shopping_mall,
            self.game,
            self.email_trade,
            self.romance,
            self.investment,
            self.etc,
        ]
        .into_iter()
        .fold(self.direct_trade, i64::saturating_add)
    }
}

/// GET one page of the cyber-scam API and return its `data` array.
pub fn fetch_cyber_scam(
    transport: &dyn HttpTransport,
    config:    &IngestConfig,
    page:      u32,
    per_page:  u32,
) -> IngestResult<Vec<Value>> {
    let query = [
        ("page",       page.to_string()),
        ("perPage",    per_page.to_string()),
        ("serviceKey", config.api_key.clone()),
        ("returnType", "JSON".to_string()),
    ];
    let body = transport.get(&config.scam.url(), &query)?;
    extract_data_rows(&body)
}

/// Pull the `data` array out of a response body. A missing or non-array
/// `data` key means "no rows".
pub fn extract_data_rows(body: &str) -> IngestResult<Vec<Value>> {
    let doc: Value = serde_json::from_str(body)?;
    match doc.get("data") {
        Some(Value::Array(rows)) => Ok(rows.clone()),
        _ => {
            log::warn!("cyber-scam response carried no data array");
            Ok(Vec::new())
        }
    }
}

pub fn normalize_cyber_row(row: &Value) -> Result<CyberScamRecord, SkipReason> {
    let row = row.as_object().ok_or(SkipReason::NotAnObject)?;

    let year_raw = field(row, FIELD_YEAR).ok_or(SkipReason::MissingField(FIELD_YEAR))?;
    let year = parse_strict(year_raw)
        .and_then(|y| Year::try_from(y).ok())
        .ok_or_else(|| SkipReason::NotNumeric {
            field: FIELD_YEAR,
            value: describe(year_raw),
        })?;

    let category = match field(row, FIELD_CATEGORY) {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(SkipReason::MissingField(FIELD_CATEGORY)),
    };

    // Counters are never negative; absent or garbled cells count as 0.
    let count = |key: &str| coerce_value(row.get(key)).max(0);

    Ok(CyberScamRecord {
        year,
        category,
        direct_trade:  count(FIELD_DIRECT_TRADE),
        shopping_mall: count(FIELD_SHOPPING_MALL),
        game:          count(FIELD_GAME),
        email_trade:   count(FIELD_EMAIL_TRADE),
        romance:       count(FIELD_ROMANCE),
        investment:    count(FIELD_INVESTMENT),
        etc:           count(FIELD_ETC),
    })
}

pub fn normalize_cyber_rows(rows: &[Value]) -> BatchOutcome<CyberScamRecord> {
    BatchOutcome::from_rows(rows, normalize_cyber_row)
}
