//! Per-source fetchers and row normalizers.
//!
//! Fetchers deal with transport-level shape ambiguity and hand back raw
//! decoded rows. Normalizers turn each raw row into a typed record or a
//! [`crate::outcome::SkipReason`].

pub mod cyber;
pub mod travel;
pub mod travel_csv;
pub mod voice;

use serde_json::{Map, Value};

/// Look up a key on a decoded row, treating JSON `null` as absent.
pub(crate) fn field<'a>(row: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    row.get(key).filter(|v| !v.is_null())
}

/// Truthiness for required key fields: null, empty string, zero and
/// `false` all count as "no value".
pub(crate) fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Bool(b) => !b,
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Render a raw value for a skip message without quoting plain strings.
pub(crate) fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
