//! Timestamp parsing for as-of joins.
//!
//! Values are tried against a fixed, ordered list of formats and the first
//! successful parse wins:
//!
//! 1. date + time with seconds (optional fraction): `2024-01-15 10:30:00`,
//!    `2024-01-15T10:30:00.250`, `2024/01/15 10:30:00`
//! 2. date + time with minutes: `2024-01-15 10:30`
//! 3. date only: `2024-01-15`, `2024/01/15`
//! 4. compact numeric: `20240115103000`, `202401151030`, `20240115`; only
//!    digit strings of exactly those widths, so `2024115` stays a number
//! 5. fallbacks: RFC 3339 with offset, US `01/15/2024 10:30:00`, and a plain
//!    decimal number of seconds (elapsed-time sensor columns)
//!
//! Values without an offset are taken as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const SECONDS_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
];

const MINUTES_FORMATS: &[&str] = &["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y/%m/%d %H:%M"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

const COMPACT_DATETIME_FORMATS: &[&str] = &["%Y%m%d%H%M%S", "%Y%m%d%H%M"];

const COMPACT_DATE_FORMATS: &[&str] = &["%Y%m%d"];

const COMPACT_DATETIME_WIDTHS: &[usize] = &[12, 14];

const COMPACT_DATE_WIDTHS: &[usize] = &[8];

const FALLBACK_DATETIME_FORMATS: &[&str] = &["%m/%d/%Y %H:%M:%S", "%m/%d/%Y %H:%M"];

const FALLBACK_DATE_FORMATS: &[&str] = &["%m/%d/%Y"];

const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// A point in time with microsecond resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    pub fn from_seconds(seconds: f64) -> Option<Self> {
        seconds_to_micros(seconds).map(Self)
    }

    pub fn micros(self) -> i64 {
        self.0
    }

    /// Absolute distance in microseconds.
    pub fn distance(self, other: Self) -> u64 {
        self.0.abs_diff(other.0)
    }

    /// Parses `value` with the ordered format list; `None` when nothing fits.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        parse_datetime(value, SECONDS_FORMATS)
            .or_else(|| parse_datetime(value, MINUTES_FORMATS))
            .or_else(|| parse_date(value, DATE_FORMATS))
            .or_else(|| {
                is_compact(value, COMPACT_DATETIME_WIDTHS)
                    .then(|| parse_datetime(value, COMPACT_DATETIME_FORMATS))
                    .flatten()
            })
            .or_else(|| {
                is_compact(value, COMPACT_DATE_WIDTHS)
                    .then(|| parse_date(value, COMPACT_DATE_FORMATS))
                    .flatten()
            })
            .or_else(|| parse_fallback(value))
    }
}

/// Converts a seconds value to whole microseconds, rejecting non-finite or
/// out-of-range input.
pub fn seconds_to_micros(seconds: f64) -> Option<i64> {
    if !seconds.is_finite() {
        return None;
    }
    let micros = (seconds * MICROS_PER_SECOND).round();
    if micros.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(micros as i64)
}

/// chrono reads numeric fields with variable width, so `%Y%m%d` alone would
/// also accept 5 to 7 digits.
fn is_compact(value: &str, widths: &[usize]) -> bool {
    widths.contains(&value.len()) && value.bytes().all(|byte| byte.is_ascii_digit())
}

fn parse_datetime(value: &str, formats: &[&str]) -> Option<Timestamp> {
    formats.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(value, format)
            .ok()
            .map(|datetime| Timestamp(datetime.and_utc().timestamp_micros()))
    })
}

fn parse_date(value: &str, formats: &[&str]) -> Option<Timestamp> {
    formats.iter().find_map(|format| {
        NaiveDate::parse_from_str(value, format)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|datetime| Timestamp(datetime.and_utc().timestamp_micros()))
    })
}

fn parse_fallback(value: &str) -> Option<Timestamp> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(Timestamp(datetime.timestamp_micros()));
    }
    parse_datetime(value, FALLBACK_DATETIME_FORMATS)
        .or_else(|| parse_date(value, FALLBACK_DATE_FORMATS))
        .or_else(|| value.parse::<f64>().ok().and_then(Timestamp::from_seconds))
}
