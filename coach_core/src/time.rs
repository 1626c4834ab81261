//! Date, duration and pace helpers.
//!
//! Weeks always start on Monday (ISO convention) regardless of locale.

use chrono::{Datelike, Duration, NaiveDate};

/// The Monday at or before `date`
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Render seconds as `H:MM:SS` (one hour or more) or `M:SS`
pub fn format_duration(seconds: u32) -> String {
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

/// Render a pace as `M:SS/km`; empty for non-finite or non-positive input
pub fn format_pace(sec_per_km: f64) -> String {
    if !sec_per_km.is_finite() || sec_per_km <= 0.0 {
        return String::new();
    }
    let total = sec_per_km.round() as u64;
    format!("{}:{:02}/km", total / 60, total % 60)
}

/// Parse `"M"` (fractional minutes), `"M:S"` or `"H:M:S"` into seconds
pub fn parse_duration(text: &str) -> Option<u32> {
    let parts = numeric_parts(text)?;
    let seconds = match parts.as_slice() {
        [m] => m * 60.0,
        [m, s] => m * 60.0 + s,
        [h, m, s] => h * 3600.0 + m * 60.0 + s,
        _ => return None,
    };
    to_whole_seconds(seconds)
}

/// Parse a manually entered pace, `"M:S"` or bare `"M"` minutes per km
pub fn parse_pace(text: &str) -> Option<u32> {
    let parts = numeric_parts(text)?;
    let seconds = match parts.as_slice() {
        [m] => m * 60.0,
        [m, s] => m * 60.0 + s,
        _ => return None,
    };
    to_whole_seconds(seconds).filter(|s| *s > 0)
}

fn numeric_parts(text: &str) -> Option<Vec<f64>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.split(':')
        .map(|part| part.trim().parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect()
}

fn to_whole_seconds(seconds: f64) -> Option<u32> {
    if seconds < 0.0 || seconds > f64::from(u32::MAX) {
        return None;
    }
    Some(seconds.round() as u32)
}

/// `YYYY-MM-DD`
pub fn to_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

/// Week heading style, e.g. `Mon, Oct 19`
pub fn format_short_date(date: NaiveDate) -> String {
    date.format("%a, %b %-d").to_string()
}

/// Day row style, e.g. `Mon Oct 19 2026`
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%a %b %d %Y").to_string()
}

/// Kilometres with up to two decimals and no trailing zeros (`10`, `10.5`)
pub fn format_km(km: f64) -> String {
    let rounded = (km * 100.0).round() / 100.0;
    format!("{}", rounded)
}
