use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde_json::{Map, Value};
use tracing::warn;

// ---------------------------------------------------------------------------
// Amounts
// ---------------------------------------------------------------------------

fn float_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").expect("valid float regex")
    })
}

/// Parse the longest numeric prefix of `raw`, ignoring leading whitespace.
///
/// `"12.5kg"` is 12.5, `"  7"` is 7, `"abc"` and `""` are `None`. Values that
/// overflow to infinity are rejected so they can never reach a JSON body.
pub fn parse_float_prefix(raw: &str) -> Option<f64> {
    let m = float_prefix().find(raw.trim_start())?;
    m.as_str().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Coerce an incoming JSON `amount` to a number, falling back to 0.
pub fn coerce_amount(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        Some(Value::String(s)) => parse_float_prefix(s).unwrap_or(0.0),
        _ => 0.0,
    }
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d %b %Y", "%b %d, %Y"];

/// Parse a date cell written as text. Offsets are dropped after reading so
/// the wall-clock time as recorded decides the calendar day.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.naive_local());
    }
    // "Fri Jan 05 2024 10:00:00 GMT+0700 (Western Indonesia Time)"
    let without_zone_name = s.split(" (").next().unwrap_or(s);
    if let Ok(dt) = DateTime::parse_from_str(without_zone_name, "%a %b %d %Y %H:%M:%S GMT%z") {
        return Some(dt.naive_local());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.and_time(NaiveTime::MIN));
        }
    }
    None
}

fn target_date_shape() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid target date regex"))
}

/// Parse the `date` query parameter, which must be a literal `YYYY-MM-DD`:
/// zero-padded, no surrounding whitespace.
pub fn parse_target_date(raw: &str) -> Option<NaiveDate> {
    if !target_date_shape().is_match(raw) {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

// ---------------------------------------------------------------------------
// Free-text extraction
// ---------------------------------------------------------------------------

fn first_object() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\{.*?\}").expect("valid object regex"))
}

/// Pull the first flat `{...}` JSON object out of a chatty reply.
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    let Some(m) = first_object().find(text) else {
        warn!(text, "no JSON object found in text");
        return None;
    };
    match serde_json::from_str::<Value>(m.as_str()) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => None,
        Err(e) => {
            warn!(error = %e, candidate = m.as_str(), "failed to decode JSON object");
            None
        }
    }
}
