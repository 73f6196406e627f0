//! Timestamp and duration rendering.
//!
//! Every function here is total: bad input degrades to an empty string or is
//! passed through unchanged, never an error.

use std::cmp::Ordering;
use std::fmt::Display;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde_json::Value;

const DISPLAY_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Parses an ISO-8601 timestamp. Values without an offset are read as UTC.
pub fn parse_timestamp(ts: &str) -> Option<DateTime<FixedOffset>> {
    let ts = ts.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Some(dt);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc().into());
    }
    NaiveDate::parse_from_str(ts, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().into())
}

/// Renders a timestamp in the local time zone.
pub fn format_timestamp(ts: Option<&str>) -> String {
    format_timestamp_in(ts, &Local)
}

/// Renders a timestamp in `tz`, e.g. `1/1/2024, 12:00:00 AM`.
pub fn format_timestamp_in<Tz>(ts: Option<&str>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let Some(ts) = ts.filter(|s| !s.is_empty()) else {
        return String::new();
    };
    match parse_timestamp(ts) {
        Some(dt) => dt.with_timezone(tz).format(DISPLAY_FORMAT).to_string(),
        None => ts.to_string(),
    }
}

/// Human-readable elapsed time between two timestamps.
pub fn calculate_duration(start: Option<&str>, end: Option<&str>) -> String {
    let (Some(start), Some(end)) = (
        start.filter(|s| !s.is_empty()),
        end.filter(|s| !s.is_empty()),
    ) else {
        return String::new();
    };
    match (parse_timestamp(start), parse_timestamp(end)) {
        (Some(start), Some(end)) => format_duration_ms(end.timestamp_millis() - start.timestamp_millis()),
        _ => String::new(),
    }
}

/// `500ms`, `2.50s`, `2m 5.00s`. Negative values land in the millisecond band.
pub fn format_duration_ms(ms: i64) -> String {
    if ms < 1_000 {
        format!("{ms}ms")
    } else if ms < 60_000 {
        format!("{}s", seconds_2dp(ms))
    } else {
        let minutes = ms / 60_000;
        format!("{minutes}m {}s", seconds_2dp(ms % 60_000))
    }
}

/// `ms / 1000` to two decimals. Of the two nearest candidates the one
/// closer to the `f64` quotient wins, and an exact tie rounds up.
fn seconds_2dp(ms: i64) -> String {
    let centis = ms / 10 + i64::from(rounds_up(ms));
    format!("{}.{:02}", centis / 100, centis % 100)
}

fn rounds_up(ms: i64) -> bool {
    match (ms % 10).cmp(&5) {
        Ordering::Less => false,
        Ordering::Greater => true,
        Ordering::Equal => {
            // Sign of `fl(ms / 1000) * 1000 - ms`, computed with one rounding.
            let quotient = ms as f64 / 1_000.0;
            quotient.mul_add(1_000.0, -(ms as f64)) >= 0.0
        }
    }
}

/// Strings as-is, anything else as pretty-printed JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}
