//! Timestamp and date parsing for crawler payload values.
//!
//! Crawlers disagree wildly about time: RFC 3339 with `Z`, naive datetimes,
//! bare dates, epoch seconds, epoch milliseconds. Everything normalizes to a
//! [`DateTime<FixedOffset>`]; the canonical wire form is RFC 3339 with an
//! explicit numeric offset, so `Z` inputs re-emit as `+00:00`.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde_json::Value;

/// Naive datetime formats accepted from payloads, tried in order. Values
/// without an offset are assumed UTC.
const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

/// Date-only formats; parsed values sit at midnight UTC when a timestamp is
/// needed.
const DATE_FORMATS: [&str; 5] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%d-%b-%Y",
];

/// Epoch values at or above this magnitude are milliseconds, below are
/// seconds. The cutoff (Sat Mar 03 1973 in milliseconds) is far past any
/// plausible second-resolution crawl date.
const EPOCH_MILLIS_CUTOFF: i64 = 100_000_000_000;

/// Parse a timestamp string into an offset-carrying datetime.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed);
    }
    for fmt in &DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(Utc.from_utc_datetime(&naive).fixed_offset());
        }
    }
    for fmt in &DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            let naive = date.and_time(NaiveTime::MIN);
            return Some(Utc.from_utc_datetime(&naive).fixed_offset());
        }
    }
    if trimmed.chars().all(|c| c.is_ascii_digit()) {
        return trimmed.parse::<i64>().ok().and_then(from_epoch);
    }
    None
}

/// Parse a timestamp from any JSON scalar. Strings go through
/// [`parse_timestamp`]; numbers are epoch seconds or milliseconds.
pub fn parse_timestamp_value(value: &Value) -> Option<DateTime<FixedOffset>> {
    match value {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                from_epoch(i)
            } else {
                // Fractional epochs are seconds with sub-second precision.
                n.as_f64().filter(|f| f.is_finite()).and_then(|f| {
                    let secs = f.trunc() as i64;
                    let nanos = (f.fract().abs() * 1_000_000_000.0) as u32;
                    DateTime::from_timestamp(secs, nanos).map(|dt| dt.fixed_offset())
                })
            }
        }
        _ => None,
    }
}

/// Parse a date string, falling back to the date component of any parseable
/// timestamp.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    for fmt in &DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(date);
        }
    }
    parse_timestamp(trimmed).map(|dt| dt.date_naive())
}

/// Calendar date of a JSON scalar timestamp, in the timestamp's own offset.
pub fn date_of_value(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => parse_date(s),
        Value::Number(_) => parse_timestamp_value(value).map(|dt| dt.date_naive()),
        _ => None,
    }
}

/// Canonical wire form: RFC 3339 with an explicit numeric offset.
pub fn canonical_timestamp(dt: &DateTime<FixedOffset>) -> String {
    dt.to_rfc3339()
}

fn from_epoch(value: i64) -> Option<DateTime<FixedOffset>> {
    let (secs, millis) = if value.abs() >= EPOCH_MILLIS_CUTOFF {
        (value.div_euclid(1000), value.rem_euclid(1000))
    } else {
        (value, 0)
    };
    let nanos = u32::try_from(millis).ok()?.checked_mul(1_000_000)?;
    DateTime::from_timestamp(secs, nanos).map(|dt| dt.fixed_offset())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc3339_z_reemits_explicit_offset() {
        let dt = parse_timestamp("2025-07-12T10:30:00Z").unwrap();
        assert_eq!(canonical_timestamp(&dt), "2025-07-12T10:30:00+00:00");
    }

    #[test]
    fn test_offset_is_preserved() {
        let dt = parse_timestamp("2025-07-12T10:30:00-05:00").unwrap();
        assert_eq!(canonical_timestamp(&dt), "2025-07-12T10:30:00-05:00");
        assert_eq!(dt.date_naive().to_string(), "2025-07-12");
    }

    #[test]
    fn test_naive_datetime_assumed_utc() {
        let dt = parse_timestamp("2025-07-12 10:30:00").unwrap();
        assert_eq!(canonical_timestamp(&dt), "2025-07-12T10:30:00+00:00");
        let dt = parse_timestamp("2025-07-12T10:30:00").unwrap();
        assert_eq!(canonical_timestamp(&dt), "2025-07-12T10:30:00+00:00");
    }

    #[test]
    fn test_date_only_sits_at_midnight() {
        let dt = parse_timestamp("2025-07-12").unwrap();
        assert_eq!(canonical_timestamp(&dt), "2025-07-12T00:00:00+00:00");
    }

    #[test]
    fn test_epoch_seconds_and_millis() {
        let secs = parse_timestamp("1752316200").unwrap();
        assert_eq!(canonical_timestamp(&secs), "2025-07-12T10:30:00+00:00");
        let millis = parse_timestamp("1752316200000").unwrap();
        assert_eq!(millis, secs);
    }

    #[test]
    fn test_epoch_number_values() {
        let from_int = parse_timestamp_value(&serde_json::json!(1752316200)).unwrap();
        assert_eq!(canonical_timestamp(&from_int), "2025-07-12T10:30:00+00:00");
        let from_millis = parse_timestamp_value(&serde_json::json!(1752316200000_i64)).unwrap();
        assert_eq!(from_millis, from_int);
    }

    #[test]
    fn test_unparseable_is_none() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("not a date").is_none());
        assert!(parse_timestamp_value(&serde_json::json!(true)).is_none());
    }

    #[test]
    fn test_parse_date_variants() {
        let expected = NaiveDate::from_ymd_opt(2025, 7, 12).unwrap();
        assert_eq!(parse_date("2025-07-12"), Some(expected));
        assert_eq!(parse_date("12/07/2025"), Some(expected));
        assert_eq!(parse_date("12-Jul-2025"), Some(expected));
        assert_eq!(parse_date("2025-07-12T10:30:00Z"), Some(expected));
    }
}
