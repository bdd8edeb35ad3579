//! Permissive, locale-agnostic timestamp parsing for the `Time` column.
//!
//! Ambiguous slash dates are read month-first and fall back to day-first when
//! the month-first reading is impossible (`13/01/2024` is the 13th of January).
//! Month-first is intentional, although Medellín writes dates day-first:
//! `02/03/2024` is the 3rd of February. Day-first data should use ISO
//! `YYYY-MM-DD` timestamps.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y", "%d-%m-%Y"];

/// Parse a timestamp into a naive (zone-less) datetime. Offsets are converted to UTC.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    None
}

/// Parse a timestamp into milliseconds since the Unix epoch.
pub fn parse_timestamp_millis(s: &str) -> Option<i64> {
    parse_timestamp(s).map(|dt| dt.and_utc().timestamp_millis())
}

/// Integer `Time` values are nanoseconds since the Unix epoch.
pub fn nanos_to_millis(nanos: i64) -> i64 {
    nanos.div_euclid(1_000_000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn iso_minutes_without_seconds() {
        let dt = parse_timestamp("2024-01-01T01:00").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 1, 1));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (1, 0, 0));
    }

    #[test]
    fn space_separated_with_fraction() {
        let dt = parse_timestamp(" 2024-03-05 10:20:30.250 ").unwrap();
        assert_eq!(dt.second(), 30);
        assert_eq!(dt.nanosecond(), 250_000_000);
    }

    #[test]
    fn rfc3339_offset_is_normalized_to_utc() {
        let dt = parse_timestamp("2024-01-01T00:00:00-05:00").unwrap();
        assert_eq!(dt.hour(), 5);
    }

    #[test]
    fn date_only_is_midnight() {
        let dt = parse_timestamp("2024/02/29").unwrap();
        assert_eq!((dt.month(), dt.day(), dt.hour()), (2, 29, 0));
    }

    #[test]
    fn slash_dates_are_month_first_then_day_first() {
        let dt = parse_timestamp("02/03/2024").unwrap();
        assert_eq!((dt.month(), dt.day()), (2, 3));
        let dt = parse_timestamp("13/03/2024 08:15").unwrap();
        assert_eq!((dt.month(), dt.day(), dt.hour()), (3, 13, 8));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("2024-13-01").is_none());
    }

    #[test]
    fn millis_since_epoch() {
        assert_eq!(parse_timestamp_millis("1970-01-01T00:00:01"), Some(1000));
        assert_eq!(nanos_to_millis(1_500_000_000), 1500);
        assert_eq!(nanos_to_millis(-1), -1);
    }
}
