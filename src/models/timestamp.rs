//! Timestamp normalization for backend documents.
//!
//! The document store hands timestamps back in several shapes depending on
//! which client wrote them: native date values (epoch milliseconds), the
//! backend's timestamp object (`{seconds, nanoseconds}`, or the
//! `{_seconds, _nanoseconds}` form produced by admin exports), extended JSON
//! `{"$date": ...}` wrappers, and plain strings. Every record goes through
//! [`to_point_in_time`] before anything else reads it.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Convert a timestamp-like value into a point in time.
///
/// Returns `fallback` for `None`, `null` and anything that cannot be read as
/// a timestamp. Callers pass the current time as the fallback.
pub fn to_point_in_time(value: Option<&Value>, fallback: DateTime<Utc>) -> DateTime<Utc> {
    value.and_then(parse_value).unwrap_or(fallback)
}

fn parse_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_str(s),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        Value::Object(map) => {
            if let Some(inner) = map.get("$date") {
                return parse_value(inner);
            }
            let seconds = map.get("seconds").or_else(|| map.get("_seconds"))?.as_i64()?;
            let nanos = map
                .get("nanoseconds")
                .or_else(|| map.get("_nanoseconds"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            Utc.timestamp_opt(seconds, u32::try_from(nanos).ok()?).single()
        }
        _ => None,
    }
}

fn parse_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
