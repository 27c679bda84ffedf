//! Core type definitions with validation.

use std::fmt;

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum length of an employee code after trimming.
pub const EMPLOYEE_CODE_MAX_LEN: usize = 50;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The provided value exceeded its maximum length.
    #[error("{field} cannot exceed {max} characters, got {len}")]
    TooLong {
        field: &'static str,
        max: usize,
        len: usize,
    },

    /// Unknown attendance status.
    #[error("invalid attendance status: {value}")]
    InvalidStatus { value: String },

    /// Unknown punch direction.
    #[error("invalid punch direction: {value}")]
    InvalidDirection { value: String },

    /// Unknown confidence level.
    #[error("invalid confidence level: {value}")]
    InvalidConfidence { value: String },

    /// Unknown interval kind.
    #[error("invalid interval kind: {value}")]
    InvalidIntervalKind { value: String },

    /// A date range whose end precedes its start.
    #[error("date range end {end} is before start {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// An interval that does not move forward in time.
    #[error("check-out {check_out} must be after check-in {check_in}")]
    NonPositiveInterval {
        check_in: NaiveDateTime,
        check_out: NaiveDateTime,
    },

    /// A timestamp that could not be parsed.
    #[error("invalid timestamp: {value}")]
    InvalidTimestamp { value: String },

    /// A time of day that could not be parsed.
    #[error("invalid time of day (expected HH:MM): {value}")]
    InvalidTimeOfDay { value: String },
}

/// A validated employee code.
///
/// Codes are trimmed on construction, must be non-empty, and may not exceed
/// [`EMPLOYEE_CODE_MAX_LEN`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmployeeCode(String);

impl EmployeeCode {
    /// Creates a new code after trimming and validation.
    pub fn new(code: impl AsRef<str>) -> Result<Self, ValidationError> {
        let trimmed = code.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty {
                field: "employee code",
            });
        }
        let len = trimmed.chars().count();
        if len > EMPLOYEE_CODE_MAX_LEN {
            return Err(ValidationError::TooLong {
                field: "employee code",
                max: EMPLOYEE_CODE_MAX_LEN,
                len,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EmployeeCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EmployeeCode> for String {
    fn from(code: EmployeeCode) -> Self {
        code.0
    }
}

impl fmt::Display for EmployeeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for EmployeeCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An inclusive range of calendar days.
///
/// Used only to bound queries; `end >= start` is enforced on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Creates a range, rejecting `end < start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if end < start {
            return Err(ValidationError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// A single-day range.
    pub const fn single(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    /// The range covering today (local time).
    pub fn today() -> Self {
        Self::single(Local::now().date_naive())
    }

    /// The last `days` days up to and including today.
    pub fn last_n_days(days: u32) -> Self {
        Self::last_n_days_from(Local::now().date_naive(), days)
    }

    /// The last `days` days up to and including `today`.
    ///
    /// `last_n_days_from(d, 0)` is the single day `d`.
    pub fn last_n_days_from(today: NaiveDate, days: u32) -> Self {
        let start = today
            .checked_sub_days(chrono::Days::new(u64::from(days.saturating_sub(1))))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end: today }
    }

    /// The calendar month containing today.
    pub fn current_month() -> Self {
        Self::month_of(Local::now().date_naive())
    }

    /// The calendar month containing `day`.
    pub fn month_of(day: NaiveDate) -> Self {
        let start = day.with_day(1).unwrap_or(day);
        let end = start
            .checked_add_months(chrono::Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(day);
        Self { start, end }
    }

    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of calendar days covered (inclusive of both ends).
    pub fn duration_in_days(&self) -> i64 {
        self.end.signed_duration_since(self.start).num_days() + 1
    }

    /// Whether `day` falls inside the range.
    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start && day <= self.end
    }

    /// Iterates every day in the range in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

impl<'de> Deserialize<'de> for DateRange {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            start: NaiveDate,
            end: NaiveDate,
        }

        let raw = Raw::deserialize(deserializer)?;
        Self::new(raw.start, raw.end).map_err(serde::de::Error::custom)
    }
}

/// Qualitative trust rating for a punch or a reconciled day.
///
/// Variants are ordered from least to most trusted, so combining ratings is
/// `min`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    #[default]
    High,
}

impl Confidence {
    /// String representation for storage and DTOs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Confidence {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(ValidationError::InvalidConfidence {
                value: s.to_string(),
            }),
        }
    }
}

/// Direction reported by a punch device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
    Break,
}

impl Direction {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
            Self::Break => "break",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Direction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in" => Ok(Self::In),
            "out" => Ok(Self::Out),
            "break" => Ok(Self::Break),
            _ => Err(ValidationError::InvalidDirection {
                value: s.to_string(),
            }),
        }
    }
}

/// Whether an interval is worked time or a break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalKind {
    Work,
    Break,
}

impl IntervalKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Break => "break",
        }
    }
}

impl fmt::Display for IntervalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IntervalKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "work" => Ok(Self::Work),
            "break" => Ok(Self::Break),
            _ => Err(ValidationError::InvalidIntervalKind {
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn employee_code_rejects_empty() {
        assert!(EmployeeCode::new("").is_err());
        assert!(EmployeeCode::new("   ").is_err());
        assert!(EmployeeCode::new("EMP001").is_ok());
    }

    #[test]
    fn employee_code_is_trimmed() {
        let code = EmployeeCode::new("  EMP001 ").unwrap();
        assert_eq!(code.as_str(), "EMP001");
        assert_eq!(code, EmployeeCode::new("EMP001").unwrap());
    }

    #[test]
    fn employee_code_length_limit() {
        assert!(EmployeeCode::new("a".repeat(50)).is_ok());
        let err = EmployeeCode::new("a".repeat(51)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooLong {
                field: "employee code",
                max: 50,
                len: 51
            }
        );
    }

    #[test]
    fn employee_code_serde_roundtrip() {
        let code = EmployeeCode::new("EMP-7").unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"EMP-7\"");
        let parsed: EmployeeCode = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, code);
    }

    #[test]
    fn employee_code_serde_rejects_blank() {
        let result: Result<EmployeeCode, _> = serde_json::from_str("\"  \"");
        assert!(result.is_err());
    }

    #[test]
    fn date_range_rejects_reversed() {
        assert!(DateRange::new(date(2025, 1, 2), date(2025, 1, 1)).is_err());
        assert!(DateRange::new(date(2025, 1, 1), date(2025, 1, 1)).is_ok());
    }

    #[test]
    fn date_range_serde_rejects_reversed() {
        let result: Result<DateRange, _> =
            serde_json::from_str(r#"{"start":"2025-01-05","end":"2025-01-01"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn last_n_days_includes_today() {
        let range = DateRange::last_n_days_from(date(2025, 3, 10), 7);
        assert_eq!(range.start(), date(2025, 3, 4));
        assert_eq!(range.end(), date(2025, 3, 10));
        assert_eq!(range.duration_in_days(), 7);
        assert_eq!(range.days().count(), 7);
    }

    #[test]
    fn month_of_handles_february() {
        let range = DateRange::month_of(date(2024, 2, 14));
        assert_eq!(range.start(), date(2024, 2, 1));
        assert_eq!(range.end(), date(2024, 2, 29));
        assert!(range.contains(date(2024, 2, 29)));
        assert!(!range.contains(date(2024, 3, 1)));
    }

    #[test]
    fn confidence_orders_low_to_high() {
        assert!(Confidence::Low < Confidence::Medium);
        assert!(Confidence::Medium < Confidence::High);
        assert_eq!(Confidence::High.min(Confidence::Low), Confidence::Low);
    }

    #[test]
    fn enums_parse_case_insensitively() {
        assert_eq!("HIGH".parse::<Confidence>().unwrap(), Confidence::High);
        assert_eq!(" Out ".parse::<Direction>().unwrap(), Direction::Out);
        assert_eq!("Break".parse::<IntervalKind>().unwrap(), IntervalKind::Break);
        assert!("sideways".parse::<Direction>().is_err());
        assert!("certain".parse::<Confidence>().is_err());
    }
}
