// Display formatters for proof metadata
//
// Numbers, costs and timestamps as they appear in the metadata panel.

use crate::util::parse_timestamp;
use chrono::{DateTime, Local, Utc};

/// Format a large number with commas for readability
///
/// # Examples
/// ```ignore
/// assert_eq!(format_number(1234567), "1,234,567");
/// assert_eq!(format_number(42), "42");
/// ```
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();

    for (count, ch) in s.chars().rev().enumerate() {
        if count > 0 && count % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, ch);
    }

    result
}

/// Dollar amount with six decimals; missing costs read as zero
pub fn format_usd(amount: Option<f64>) -> String {
    format!("{:.6}", amount.unwrap_or(0.0))
}

/// Seconds as the producer recorded them (`12.345`, `3`); missing reads as `0`
pub fn format_seconds(seconds: Option<f64>) -> String {
    match seconds {
        Some(s) if s.is_finite() => s.to_string(),
        _ => "0".to_string(),
    }
}

/// Absolute timestamp in local time, e.g. `1/15/2025, 10:30:00 AM`
///
/// Missing timestamps read as `Unknown`; unparseable ones are shown as written.
pub fn format_timestamp(raw: Option<&str>) -> String {
    let Some(raw) = raw.filter(|s| !s.is_empty()) else {
        return "Unknown".to_string();
    };
    match parse_timestamp(raw) {
        Some(dt) => dt
            .with_timezone(&Local)
            .format("%-m/%-d/%Y, %-I:%M:%S %p")
            .to_string(),
        None => raw.to_string(),
    }
}

/// Human-relative age of a timestamp
///
/// `Just now` under a minute (future timestamps included), then whole minutes,
/// hours and days up to a week; older timestamps show their calendar date.
pub fn format_relative_time(raw: Option<&str>, now: DateTime<Utc>) -> String {
    let Some(raw) = raw.filter(|s| !s.is_empty()) else {
        return "Unknown".to_string();
    };
    let Some(dt) = parse_timestamp(raw) else {
        return format_timestamp(Some(raw));
    };

    let diff_secs = (now - dt).num_seconds();
    let diff_mins = diff_secs / 60;
    let diff_hours = diff_mins / 60;
    let diff_days = diff_hours / 24;

    if diff_secs < 60 {
        "Just now".to_string()
    } else if diff_mins < 60 {
        plural_ago(diff_mins, "minute")
    } else if diff_hours < 24 {
        plural_ago(diff_hours, "hour")
    } else if diff_days < 7 {
        plural_ago(diff_days, "day")
    } else {
        dt.with_timezone(&Local).format("%-m/%-d/%Y").to_string()
    }
}

fn plural_ago(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}
