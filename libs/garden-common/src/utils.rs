//! Formatting and parsing helpers

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::constants::{DATETIME_FORMATS, DATE_FORMATS, DAY_GROUP_FORMAT, SHORT_DATE_FORMAT};

/// Format a date as `YYYY-MM-DD`
#[must_use]
pub fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Format a date as a day-group heading, e.g. "January 6, 2024"
#[must_use]
pub fn format_day_heading(date: &NaiveDate) -> String {
    date.format(DAY_GROUP_FORMAT).to_string()
}

/// Format a date for inline text, e.g. "Apr 15"
#[must_use]
pub fn format_short_date(date: &NaiveDate) -> String {
    date.format(SHORT_DATE_FORMAT).to_string()
}

/// Parse a date string in any of the supported [`DATE_FORMATS`]
///
/// A full RFC 3339 timestamp is also accepted; its UTC date is returned.
#[must_use]
pub fn parse_date(date_str: &str) -> Option<NaiveDate> {
    let trimmed = date_str.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .or_else(|| parse_datetime(trimmed).map(|dt| dt.date_naive()))
}

/// Parse a timestamp string
///
/// Accepts RFC 3339, the naive [`DATETIME_FORMATS`] (read as UTC), and a bare
/// `YYYY-MM-DD` date (midnight UTC).
#[must_use]
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(naive) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
    {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Crop name with the variety in parentheses when present
#[must_use]
pub fn display_name(crop_name: &str, variety: Option<&str>) -> String {
    match variety.map(str::trim).filter(|v| !v.is_empty()) {
        Some(variety) => format!("{crop_name} ({variety})"),
        None => crop_name.to_string(),
    }
}

/// `"1 planting"` / `"3 plantings"`
#[must_use]
pub fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

/// Truncate a string to a maximum number of characters
#[must_use]
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
