//! Live tourism-statistics API (monthly departures per country code).

use crate::{
    coerce::coerce_value,
    config::IngestConfig,
    error::{IngestError, IngestResult},
    http::HttpTransport,
    types::{Direction, Month, Year},
    xml::{get_ci, lookup_path, xml_to_value},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const ITEM_PATH: [&str; 4] = ["response", "body", "items", "item"];

/// One travel fact. Natural key: `(year, month, country, direction)`.
///
/// `month == 0` marks an annual total loaded from the CSV files. CSV rows
/// key `country` as `"<region>:<name>"` instead of a numeric country code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelRecord {
    pub year:         Year,
    pub month:        Month,
    pub country:      String,
    pub direction:    Direction,
    pub departures:   i64,
    pub region:       Option<String>,
    pub country_name: Option<String>,
    /// Year-over-year change in percent, when the source reports one.
    pub ratio:        Option<f64>,
}

/// `YYYYMM` query value for the tourism API.
pub fn year_month(year: Year, month: Month) -> IngestResult<String> {
    if !(1..=12).contains(&month) {
        return Err(IngestError::Config(format!("month {month} is outside 1..=12")));
    }
    Ok(format!("{year}{month:02}"))
}

/// GET one (month, country, direction) cell and return its `item`, or
/// `None` when the API has nothing for that query.
pub fn fetch_travel_stats(
    transport:    &dyn HttpTransport,
    config:       &IngestConfig,
    year_month:   &str,
    country_code: &str,
    direction:    Direction,
) -> IngestResult<Option<Value>> {
    let query = [
        ("serviceKey", config.api_key.clone()),
        ("YM",         year_month.to_string()),
        ("NAT_CD",     country_code.to_string()),
        ("ED_CD",      direction.code().to_string()),
    ];
    let body = transport.get(&config.travel.url(), &query)?;
    Ok(extract_item(&body))
}

/// Parse a response body (JSON first, then XML) and pull out the item.
///
/// Missing paths, `null` items and unparseable bodies are all "no data".
/// When several items match, only the first is kept.
pub fn extract_item(body: &str) -> Option<Value> {
    let doc = match serde_json::from_str::<Value>(body) {
        Ok(doc) => doc,
        Err(_) => match xml_to_value(body) {
            Ok(doc) => doc,
            Err(e) => {
                log::warn!("travel response is neither JSON nor XML: {e}");
                return None;
            }
        },
    };

    match lookup_path(&doc, &ITEM_PATH)? {
        Value::Null => None,
        Value::Array(items) => items.first().filter(|v| !v.is_null()).cloned(),
        item => Some(item.clone()),
    }
}

/// Build a record for the queried key from an API item.
pub fn normalize_travel_item(
    item:         &Value,
    year:         Year,
    month:        Month,
    country_code: &str,
    direction:    Direction,
) -> TravelRecord {
    let departures = coerce_value(get_ci(item, "num")).max(0);
    let country_name = get_ci(item, "natKorNm")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let ratio = get_ci(item, "ratio").and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    })
    .filter(|r| r.is_finite());

    TravelRecord {
        year,
        month,
        country: country_code.to_string(),
        direction,
        departures,
        region: None,
        country_name,
        ratio,
    }
}
