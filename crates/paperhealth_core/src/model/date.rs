//! Calendar-date parsing and display for record dates.
//!
//! Record dates are stored as the strings the shell handed us. Parsing is
//! done on demand so malformed values can still be held, displayed and
//! reported instead of being rejected at the boundary.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATE_FORMAT: &str = "%Y-%m-%d";
const LOCAL_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parses a record date string into a calendar date.
///
/// Accepted shapes:
/// - `YYYY-MM-DD`
/// - RFC 3339 timestamp (date part in its own offset)
/// - `YYYY-MM-DDTHH:MM:SS` without offset
///
/// Returns `None` for anything else.
pub fn parse_record_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        return Some(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(timestamp.date_naive());
    }
    NaiveDateTime::parse_from_str(trimmed, LOCAL_DATETIME_FORMAT)
        .ok()
        .map(|timestamp| timestamp.date())
}

/// Formats a record date as `YYYY-MM-DD`.
///
/// Unparseable input is returned unchanged so the UI still shows something.
pub fn format_record_date(value: &str) -> String {
    match parse_record_date(value) {
        Some(date) => date.format(DATE_FORMAT).to_string(),
        None => value.to_string(),
    }
}

/// Formats a calendar date as `YYYY-MM-DD`.
pub fn format_calendar_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
