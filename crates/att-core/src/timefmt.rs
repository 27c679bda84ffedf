//! `HH:MM` formatting and parsing shared by the aggregate, calculator and DTOs.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::types::ValidationError;

/// Accepted layouts for raw punch timestamps, tried in order.
const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Formats a non-negative hour count as zero-padded `HH:MM`.
///
/// Minutes are rounded on the total, so a value just under an hour boundary
/// carries into the hour (`7.9999` is `08:00`, never `07:60`). Negative and
/// non-finite input formats as `00:00`.
#[allow(clippy::cast_possible_truncation)]
pub fn format_hours(hours: f64) -> String {
    let total_minutes = if hours.is_finite() && hours > 0.0 {
        (hours * 60.0).round() as i64
    } else {
        0
    };
    format!("{:02}:{:02}", total_minutes / 60, total_minutes % 60)
}

/// Parses `HH:MM` produced by [`format_hours`] back into fractional hours.
///
/// Hours may exceed 24; minutes must be below 60.
pub fn parse_hours_formatted(s: &str) -> Option<f64> {
    let (h, m) = s.trim().split_once(':')?;
    let hours: u32 = h.parse().ok()?;
    let minutes: u32 = m.parse().ok()?;
    if minutes >= 60 || m.len() != 2 {
        return None;
    }
    Some(f64::from(hours) + f64::from(minutes) / 60.0)
}

/// Formats a time of day as `HH:MM`; `None` formats as `00:00`.
pub fn format_time(time: Option<NaiveTime>) -> String {
    time.map_or_else(
        || "00:00".to_string(),
        |t| format!("{:02}:{:02}", t.hour(), t.minute()),
    )
}

/// Parses a 24-hour `HH:MM` time of day.
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").map_err(|_| ValidationError::InvalidTimeOfDay {
        value: s.to_string(),
    })
}

/// Minutes since midnight, ignoring seconds.
pub fn minutes_since_midnight(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Truncates a time of day to whole minutes.
pub fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    time.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time)
}

/// Parses a raw punch timestamp in local wall-clock time.
///
/// Accepts ISO 8601 with `T` or a space separator, with or without seconds
/// and fractional seconds. A bare `HH:MM` is anchored on `day` when given.
pub fn parse_timestamp(s: &str, day: Option<NaiveDate>) -> Result<NaiveDateTime, ValidationError> {
    let trimmed = s.trim();
    for format in TIMESTAMP_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(parsed);
        }
    }
    if let Some(day) = day {
        if let Ok(time) = NaiveTime::parse_from_str(trimmed, "%H:%M") {
            return Ok(day.and_time(time));
        }
    }
    Err(ValidationError::InvalidTimestamp {
        value: s.to_string(),
    })
}
