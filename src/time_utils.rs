// SPDX-License-Identifier: MIT
// Copyright 2026 QuestPass Authors

//! Shared helpers for date/time parsing and formatting.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Separator between the formatted date and the venue name.
pub const DISPLAY_SEPARATOR: &str = " · ";

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Today's date as `YYYY-MM-DD`.
pub fn format_day(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Human-readable event date, e.g. `Sat, November 15, 8:00 PM · The Fillmore`.
///
/// Without a start time the date reads `Date TBA`.
pub fn format_display_date(start: Option<DateTime<Utc>>, venue_name: Option<&str>) -> String {
    let venue = venue_name.map(str::trim).filter(|v| !v.is_empty());
    let formatted = match start {
        Some(start) => start.format("%a, %B %-d, %-I:%M %p").to_string(),
        None => "Date TBA".to_string(),
    };

    match venue {
        Some(venue) => format!("{}{}{}", formatted, DISPLAY_SEPARATOR, venue),
        None => formatted,
    }
}

/// A loosely typed point in time as it arrives from clients or upstream APIs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateInput {
    /// RFC3339 instant.
    At(DateTime<Utc>),
    /// Milliseconds since the Unix epoch.
    Millis(f64),
    /// Any other string; parsed on demand.
    Text(String),
}

/// A date string that could not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized date: {0:?}")]
pub struct DateParseError(pub String);

impl DateInput {
    /// Resolve to a UTC instant.
    ///
    /// Strings without an offset are read as UTC; a bare `YYYY-MM-DD` is
    /// midnight UTC.
    pub fn resolve(&self) -> Result<DateTime<Utc>, DateParseError> {
        match self {
            DateInput::At(at) => Ok(*at),
            DateInput::Millis(ms) => {
                if !ms.is_finite() {
                    return Err(DateParseError(ms.to_string()));
                }
                Utc.timestamp_millis_opt(*ms as i64)
                    .single()
                    .ok_or_else(|| DateParseError(ms.to_string()))
            }
            DateInput::Text(raw) => parse_date_text(raw),
        }
    }
}

impl From<DateTime<Utc>> for DateInput {
    fn from(value: DateTime<Utc>) -> Self {
        DateInput::At(value)
    }
}

impl From<&str> for DateInput {
    fn from(value: &str) -> Self {
        DateInput::Text(value.to_string())
    }
}

fn parse_date_text(raw: &str) -> Result<DateTime<Utc>, DateParseError> {
    let text = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(day) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        if let Some(midnight) = day.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&midnight));
        }
    }
    Err(DateParseError(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_date_without_start() {
        assert_eq!(format_display_date(None, None), "Date TBA");
        assert_eq!(
            format_display_date(None, Some("The Fillmore")),
            "Date TBA · The Fillmore"
        );
        assert_eq!(format_display_date(None, Some("  ")), "Date TBA");
    }

    #[test]
    fn test_display_date_with_start() {
        let start = Utc.with_ymd_and_hms(2025, 11, 15, 20, 0, 0).unwrap();
        assert_eq!(
            format_display_date(Some(start), Some("The Fillmore")),
            "Sat, November 15, 8:00 PM · The Fillmore"
        );
        let morning = Utc.with_ymd_and_hms(2025, 3, 2, 9, 5, 0).unwrap();
        assert_eq!(format_display_date(Some(morning), None), "Sun, March 2, 9:05 AM");
    }

    #[test]
    fn test_date_input_variants() {
        let expected = Utc.with_ymd_and_hms(2025, 6, 1, 18, 0, 0).unwrap();
        assert_eq!(DateInput::from("2025-06-01T18:00:00Z").resolve(), Ok(expected));
        assert_eq!(DateInput::from("2025-06-01T18:00:00").resolve(), Ok(expected));
        assert_eq!(
            DateInput::Millis(expected.timestamp_millis() as f64).resolve(),
            Ok(expected)
        );
        assert!(DateInput::from("undefinedT18:00:00").resolve().is_err());
    }

    #[test]
    fn test_date_input_deserializes_untagged() {
        let parsed: DateInput = serde_json::from_str("\"2025-06-01T18:00:00Z\"").unwrap();
        assert!(matches!(parsed, DateInput::At(_)));
        let parsed: DateInput = serde_json::from_str("1748800800000").unwrap();
        assert!(matches!(parsed, DateInput::Millis(_)));
        let parsed: DateInput = serde_json::from_str("\"next friday\"").unwrap();
        assert!(matches!(parsed, DateInput::Text(_)));
    }
}
