//! Coercion of template data into the shapes helpers work with.
//!
//! Template data is a [`serde_json::Value`]. Helpers never assume a shape;
//! they ask for the textual, decimal, floating-point or date view of a value
//! and get `None` when the value has no such view. A `None` is the signal for
//! a helper to fall back to the raw text instead of failing the render.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use regex::Regex;
use rust_decimal::Decimal;
use serde_json::Value;
use std::borrow::Cow;
use std::str::FromStr;
use std::sync::LazyLock;

/// Integers with comma thousands separators, e.g. `1,234,567.89`.
static GROUPED_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?\d{1,3}(,\d{3})+(\.\d+)?$").expect("grouped number pattern is valid")
});

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const NAIVE_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
];

/// Text form of a value; `None` only for null.
///
/// Strings are returned as-is, numbers and booleans in their JSON spelling,
/// arrays and objects as compact JSON.
pub fn to_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        other => Some(Cow::Owned(other.to_string())),
    }
}

/// Raw text written when a helper cannot coerce its input.
pub fn raw_text(value: &Value) -> String {
    to_text(value).map(Cow::into_owned).unwrap_or_default()
}

/// Whether a value counts as empty for `ifNotEmpty`.
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Parse text as a decimal, accepting surrounding whitespace and comma grouping.
pub fn parse_decimal_str(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(decimal) = Decimal::from_str(trimmed) {
        return Some(decimal);
    }
    if GROUPED_NUMBER.is_match(trimmed) {
        return Decimal::from_str(&trimmed.replace(',', "")).ok();
    }
    None
}

/// Decimal view of a value.
pub fn to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            let text = n.to_string();
            Decimal::from_str(&text).or_else(|_| Decimal::from_scientific(&text)).ok()
        }
        Value::String(s) => parse_decimal_str(s),
        _ => None,
    }
}

/// Finite floating-point view of a value.
pub fn to_float(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

/// Date-time view of a value.
///
/// Numbers are Unix timestamps in seconds. Strings are tried as RFC 3339,
/// RFC 2822, then a list of common date-time and date layouts. Values without
/// an offset are taken as UTC.
pub fn to_datetime(value: &Value) -> Option<DateTime<FixedOffset>> {
    match value {
        Value::Number(n) => {
            let seconds = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            DateTime::from_timestamp(seconds, 0).map(|dt| dt.fixed_offset())
        }
        Value::String(s) => parse_datetime_str(s),
        _ => None,
    }
}

pub fn parse_datetime_str(text: &str) -> Option<DateTime<FixedOffset>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt);
    }

    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            NAIVE_DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc().fixed_offset())
}
