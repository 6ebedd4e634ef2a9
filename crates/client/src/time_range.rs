//! Conversion of user-supplied time expressions into epoch milliseconds.
//!
//! Recognized forms, tried in order after trimming whitespace:
//! 1. Relative: `<digits><unit>` with unit in `s`, `m`, `h`, `d`, `w`, meaning
//!    that long before now.
//! 2. Bare digits: literal epoch milliseconds.
//! 3. `now` (end times only, case-insensitive).
//! 4. ISO 8601. A trailing `Z` means `+00:00`; no offset means UTC. Offsets
//!    may omit the colon (`+0200`) and times may give only the hour (`T10`).
//!
//! Invariants:
//! - Classification is strict: `10x` is not relative and falls through to ISO parsing.
//! - No ordering between start and end is enforced.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::{ClientError, Result};

const SECOND_MS: i64 = 1_000;
const MINUTE_MS: i64 = 60 * SECOND_MS;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;
const WEEK_MS: i64 = 7 * DAY_MS;

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Absolute search window in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTimeRange {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl ResolvedTimeRange {
    /// Resolve a raw start/end pair against the current wall clock.
    pub fn resolve(start: &str, end: &str) -> Result<Self> {
        Self::resolve_at(start, end, Utc::now())
    }

    /// Resolve a raw start/end pair against a fixed `now`.
    pub fn resolve_at(start: &str, end: &str, now: DateTime<Utc>) -> Result<Self> {
        Ok(Self {
            start_ms: resolve_at(start, false, now)?,
            end_ms: resolve_at(end, true, now)?,
        })
    }
}

/// Convert a time expression into epoch milliseconds using the current time.
pub fn resolve(raw: &str, is_end: bool) -> Result<i64> {
    resolve_at(raw, is_end, Utc::now())
}

/// Convert a time expression into epoch milliseconds relative to `now`.
pub fn resolve_at(raw: &str, is_end: bool, now: DateTime<Utc>) -> Result<i64> {
    let value = raw.trim();
    let now_ms = now.timestamp_millis();

    if let Some((amount, unit_ms)) = split_relative(value) {
        return amount
            .parse::<i64>()
            .ok()
            .and_then(|n| n.checked_mul(unit_ms))
            .and_then(|offset| now_ms.checked_sub(offset))
            .ok_or_else(|| invalid(raw));
    }

    if is_all_digits(value) {
        return value.parse::<i64>().map_err(|_| invalid(raw));
    }

    if is_end && value.eq_ignore_ascii_case("now") {
        return Ok(now_ms);
    }

    parse_iso8601(value).ok_or_else(|| invalid(raw))
}

fn invalid(raw: &str) -> ClientError {
    ClientError::InvalidTimeFormat {
        value: raw.to_string(),
    }
}

fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Split `24h` into `("24", HOUR_MS)`.
fn split_relative(value: &str) -> Option<(&str, i64)> {
    let (amount, unit) = value.split_at_checked(value.len().checked_sub(1)?)?;
    let unit_ms = match unit {
        "s" => SECOND_MS,
        "m" => MINUTE_MS,
        "h" => HOUR_MS,
        "d" => DAY_MS,
        "w" => WEEK_MS,
        _ => return None,
    };
    is_all_digits(amount).then_some((amount, unit_ms))
}

fn parse_iso8601(value: &str) -> Option<i64> {
    let normalized = match value.strip_suffix('Z') {
        Some(rest) => format!("{rest}+00:00"),
        None => value.to_string(),
    };
    let normalized = expand_hour_only(&normalized).unwrap_or(normalized);

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, format) {
            return Some(dt.timestamp_millis());
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }

    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Rewrite `2024-01-01T10` (optionally followed by an offset) as `2024-01-01T10:00`.
fn expand_hour_only(value: &str) -> Option<String> {
    let bytes = value.as_bytes();
    if bytes.len() < 13 || !matches!(bytes[10], b'T' | b' ') {
        return None;
    }
    if !bytes[11..13].iter().all(u8::is_ascii_digit) {
        return None;
    }
    match bytes.get(13) {
        None | Some(b'+') | Some(b'-') => Some(format!("{}:00{}", &value[..13], &value[13..])),
        _ => None,
    }
}
