// File: src/timefmt.rs
//! Date and time parsing/formatting shared by every view.
use chrono::{NaiveDate, NaiveTime};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT_SHORT: &str = "%H:%M";
pub const TIME_FORMAT_LONG: &str = "%H:%M:%S";
pub const TIME_DISPLAY_FORMAT: &str = "%-I:%M %p";
pub const MONTH_TITLE_FORMAT: &str = "%B %Y";
pub const DAY_TITLE_FORMAT: &str = "%B %-d, %Y";

/// Parses `HH:MM` or `HH:MM:SS`, picking the format from the number of parts.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    let format = match raw.split(':').count() {
        2 => TIME_FORMAT_SHORT,
        3 => TIME_FORMAT_LONG,
        _ => return None,
    };
    NaiveTime::parse_from_str(raw, format).ok()
}

pub fn is_valid_time(raw: &str) -> bool {
    parse_time(raw).is_some()
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Renders a stored time as `9:05 AM`.
pub fn display_time(raw: &str) -> String {
    if raw.trim().is_empty() {
        return "No time set".to_string();
    }
    match parse_time(raw) {
        Some(t) => t.format(TIME_DISPLAY_FORMAT).to_string(),
        None => "Invalid time".to_string(),
    }
}

/// Tag shown next to each task in the list: `2024-04-01 at 09:00`.
pub fn schedule_label(date: NaiveDate, time: &str) -> String {
    format!("{} at {}", format_date(date), time)
}

pub fn month_title(month: NaiveDate) -> String {
    month.format(MONTH_TITLE_FORMAT).to_string()
}

pub fn day_title(day: NaiveDate) -> String {
    day.format(DAY_TITLE_FORMAT).to_string()
}
