//! Structural and business-rule checks over reconciled days.

use std::fmt;

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::attendance::Attendance;
use crate::punch::PunchLog;
use crate::types::{Confidence, Direction};

/// Default limit above which a day's worked hours look suspicious.
pub const DEFAULT_EXCESSIVE_HOURS: f64 = 12.0;

/// A single finding from validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationIssue {
    #[error("no punch logs found")]
    NoPunchLogs,

    #[error("found {count} unpaired punch(es)")]
    UnpairedPunches { count: usize },

    #[error("attendance has ambiguous punches")]
    AmbiguousPunches,

    #[error("attendance data has low confidence")]
    LowConfidence,

    #[error("no work intervals calculated despite {punches} punch log(s)")]
    NoIntervals { punches: usize },

    #[error("excessive work hours: {hours:.2} (limit {limit})")]
    ExcessiveHours { hours: f64, limit: f64 },

    #[error("punch logs are not in chronological order at position {index}")]
    OutOfOrder { index: usize },

    #[error("duplicate {direction} punch at {time}")]
    DuplicatePunch {
        time: NaiveDateTime,
        direction: Direction,
    },
}

/// Outcome of a validation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// No errors. Warnings alone keep a report valid.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    /// Folds another report's findings into this one.
    pub fn merge(&mut self, other: Self) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return writeln!(f, "ok");
        }
        for error in &self.errors {
            writeln!(f, "error: {error}")?;
        }
        for warning in &self.warnings {
            writeln!(f, "warning: {warning}")?;
        }
        Ok(())
    }
}

/// Pure, side-effect-free checks over an [`Attendance`] or a punch list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttendanceValidator {
    /// Worked hours above this are flagged. Default: 12.
    pub excessive_hours: f64,
}

impl Default for AttendanceValidator {
    fn default() -> Self {
        Self {
            excessive_hours: DEFAULT_EXCESSIVE_HOURS,
        }
    }
}

impl AttendanceValidator {
    pub const fn new(excessive_hours: f64) -> Self {
        Self { excessive_hours }
    }

    /// Checks a reconciled day.
    ///
    /// Unpaired punches are found by walking the punch list again rather
    /// than trusting the stored ambiguity flag, so records corrected after
    /// reconciliation are still checked.
    pub fn validate(&self, attendance: &Attendance) -> ValidationReport {
        let mut report = ValidationReport::default();
        let punches = attendance.punch_logs();

        if punches.is_empty() {
            report.errors.push(ValidationIssue::NoPunchLogs);
        }

        let unpaired = find_unpaired_punches(punches);
        if !unpaired.is_empty() {
            report.warnings.push(ValidationIssue::UnpairedPunches {
                count: unpaired.len(),
            });
        }

        if attendance.has_ambiguous_punches() {
            report.warnings.push(ValidationIssue::AmbiguousPunches);
        }

        if attendance.confidence() == Confidence::Low {
            report.warnings.push(ValidationIssue::LowConfidence);
        }

        if attendance.intervals().is_empty() && !punches.is_empty() {
            report.warnings.push(ValidationIssue::NoIntervals {
                punches: punches.len(),
            });
        }

        let hours = attendance.calculate_total_hours();
        if hours > self.excessive_hours {
            report.warnings.push(ValidationIssue::ExcessiveHours {
                hours,
                limit: self.excessive_hours,
            });
        }

        report
    }

    /// Checks a punch list as given, without sorting it first.
    ///
    /// Out-of-order input is an error (reported once, at the first
    /// regression); each adjacent exact duplicate is a warning.
    pub fn validate_punch_sequence(&self, punches: &[PunchLog]) -> ValidationReport {
        let mut report = ValidationReport::default();

        if let Some(index) = punches
            .windows(2)
            .position(|pair| pair[1].time() < pair[0].time())
        {
            report
                .errors
                .push(ValidationIssue::OutOfOrder { index: index + 1 });
        }

        report.warnings.extend(
            punches
                .windows(2)
                .filter(|pair| pair[1].is_duplicate_of(&pair[0]))
                .map(|pair| ValidationIssue::DuplicatePunch {
                    time: pair[1].time(),
                    direction: pair[1].direction(),
                }),
        );

        report
    }

    /// True when validation yields any error or warning.
    pub fn needs_review(&self, attendance: &Attendance) -> bool {
        !self.validate(attendance).is_clean()
    }
}

/// Walks punches in order and returns the ones that close or open nothing.
///
/// Exact duplicates of the previous punch are skipped; they are reported by
/// [`AttendanceValidator::validate_punch_sequence`] instead.
fn find_unpaired_punches(punches: &[PunchLog]) -> Vec<&PunchLog> {
    #[derive(Clone, Copy)]
    enum Open<'a> {
        Nothing,
        Work(&'a PunchLog),
        Break(&'a PunchLog),
    }

    let mut unpaired = Vec::new();
    let mut open = Open::Nothing;
    let mut previous: Option<&PunchLog> = None;

    for punch in punches {
        if previous.is_some_and(|p| punch.is_duplicate_of(p)) {
            continue;
        }
        previous = Some(punch);

        open = match (open, punch.direction()) {
            (Open::Nothing, Direction::In) | (Open::Break(_), Direction::In | Direction::Break) => {
                Open::Work(punch)
            }
            (Open::Work(start), Direction::In) => {
                unpaired.push(start);
                Open::Work(punch)
            }
            (Open::Work(_), Direction::Break) => Open::Break(punch),
            (Open::Work(_) | Open::Break(_), Direction::Out) => Open::Nothing,
            (Open::Nothing, Direction::Out | Direction::Break) => {
                unpaired.push(punch);
                Open::Nothing
            }
        };
    }

    match open {
        Open::Work(start) | Open::Break(start) => unpaired.push(start),
        Open::Nothing => {}
    }
    unpaired
}
