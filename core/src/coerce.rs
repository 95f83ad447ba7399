//! Lenient numeric coercion for dirty upstream values.
//!
//! Upstream feeds mix JSON numbers, numeric strings with thousands
//! separators, dash placeholders for "no data", and outright garbage.
//! Everything here is total: bad input becomes 0, never an error.

use serde_json::Value;

/// Coerce a textual cell into a non-negative integer.
///
/// - `","` separators are stripped.
/// - a cell made only of dashes is the "no data" placeholder and reads as 0.
/// - the remainder is parsed as a float and truncated toward zero.
/// - empty, negative, dashed (`2020-01`), non-finite (`NaN`, `inf`) or
///   unparsable input yields 0.
pub fn coerce_int(raw: &str) -> i64 {
    let cleaned = raw.replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '-') {
        return 0;
    }
    if let Ok(n) = cleaned.parse::<i64>() {
        return n.max(0);
    }
    match cleaned.parse::<f64>() {
        Ok(f) if f.is_finite() && f.abs() < i64::MAX as f64 => (f.trunc() as i64).max(0),
        _ => 0,
    }
}

/// Coerce an optional text cell; a missing cell is 0.
pub fn coerce_opt(raw: Option<&str>) -> i64 {
    raw.map(coerce_int).unwrap_or(0)
}

/// Coerce a decoded JSON value. `null`/absent is 0, numbers are truncated,
/// strings go through [`coerce_int`], anything else is 0.
pub fn coerce_value(value: Option<&Value>) -> i64 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                    .map(|f| f.trunc() as i64)
            })
            .unwrap_or(0),
        Some(Value::String(s)) => coerce_int(s),
        Some(_) => 0,
    }
}

/// Strict integer parse for required key fields (year, month, cases).
///
/// Unlike [`coerce_int`] this rejects anything that is not an integer,
/// so callers can skip the row instead of storing a bogus key.
pub fn parse_strict(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}
