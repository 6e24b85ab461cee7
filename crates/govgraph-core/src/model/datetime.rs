//! Lenient date/time parsing for scraped values.
//!
//! Source systems publish dates as ISO-8601, as RFC 2822, as German or
//! English free text, or as raw epoch numbers. Everything is normalized to
//! seconds since the Unix epoch. Values without an offset are taken as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::OnceLock;

/// Formats with an explicit UTC offset.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%z",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%d.%m.%Y, %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%B %d, %Y %I:%M %p",
    "%B %d %Y %I:%M %p",
    "%b %d, %Y %I:%M %p",
    "%B %d, %Y %H:%M",
    "%b %d, %Y %H:%M",
    "%d %B %Y %H:%M",
    "%d %b %Y %H:%M",
    "%a, %d %b %Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d.%m.%Y",
    "%d/%m/%Y",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%A, %B %d, %Y",
];

fn epoch_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?\d+(\.\d+)?$").expect("valid epoch pattern"))
}

fn ordinal_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").expect("valid ordinal pattern"))
}

fn filler_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\s+(at|um|,)\s+|\s+(uhr|o'clock)$").expect("valid filler pattern"))
}

/// Parse a textual date/time into epoch seconds.
pub fn parse_epoch(input: &str) -> Option<i64> {
    let text = input.trim();
    if text.is_empty() {
        return None;
    }

    if epoch_pattern().is_match(text) {
        return parse_numeric_epoch(text);
    }

    parse_strict(text).or_else(|| parse_strict(&loosen(text)))
}

/// Whole or fractional seconds. Values outside the `i64` range are rejected.
fn parse_numeric_epoch(text: &str) -> Option<i64> {
    if let Ok(secs) = text.parse::<i64>() {
        return Some(secs);
    }
    let secs = text.parse::<f64>().ok()?.floor();
    if secs.is_finite() && secs >= i64::MIN as f64 && secs < i64::MAX as f64 {
        Some(secs as i64)
    } else {
        None
    }
}

fn parse_strict(text: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.timestamp());
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(dt.timestamp());
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.and_utc().timestamp());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp());
        }
    }

    None
}

/// Strip ordinal suffixes and connective words ("4th", "at", "Uhr").
fn loosen(text: &str) -> String {
    let text = ordinal_pattern().replace_all(text, "$1");
    let text = filler_pattern().replace_all(&text, " ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
