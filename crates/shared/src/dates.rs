//! Calendar date helpers for ISO (`yyyy-mm-dd`) dates.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

/// Error type for date parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateParseError {
    #[error("Empty date value")]
    Empty,
    #[error("Invalid date: {0}")]
    Invalid(String),
}

/// Parses a calendar date from a server value.
///
/// Accepts a plain `yyyy-mm-dd` date, an RFC 3339 timestamp, or a naive
/// `yyyy-mm-ddThh:mm:ss` timestamp. Timestamps keep only their date part.
pub fn parse_iso_date(value: &str) -> Result<NaiveDate, DateParseError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DateParseError::Empty);
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.date_naive());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(ts.date());
    }

    Err(DateParseError::Invalid(value.to_string()))
}

/// Parses a server timestamp.
///
/// Naive timestamps (no offset) are taken as UTC; a bare date is midnight UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, DateParseError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DateParseError::Empty);
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(ts.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN).and_utc());
    }

    Err(DateParseError::Invalid(value.to_string()))
}

/// Formats a date as `yyyy-mm-dd`.
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Formats a date as the short `dd-mm` axis label used by charts.
pub fn format_day_month(date: NaiveDate) -> String {
    date.format("%d-%m").to_string()
}
