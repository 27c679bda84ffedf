//! The per-day attendance aggregate.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::interval::WorkInterval;
use crate::punch::PunchLog;
use crate::status::AttendanceStatus;
use crate::timefmt::{format_hours, truncate_to_minute};
use crate::types::{Confidence, Direction, EmployeeCode};

/// The default late threshold, 09:00.
pub fn default_late_threshold() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Whether `time` is strictly after `threshold`, compared to the minute.
pub(crate) fn is_after_threshold(time: NaiveTime, threshold: NaiveTime) -> bool {
    truncate_to_minute(time) > truncate_to_minute(threshold)
}

/// One employee's reconciled record for one calendar day.
///
/// The aggregate is immutable: accessors hand out shared slices, and any
/// change (e.g. a manual status correction) builds a new instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Attendance {
    date: NaiveDate,
    employee_code: EmployeeCode,
    status: AttendanceStatus,
    punch_logs: Vec<PunchLog>,
    intervals: Vec<WorkInterval>,
    confidence: Confidence,
    has_ambiguous_punches: bool,
}

impl Attendance {
    /// Builds an aggregate from already-reconciled parts.
    ///
    /// Punches are stably sorted by time and intervals by check-in so that
    /// "first punch" and "last out" are well defined regardless of input
    /// order.
    pub fn new(
        date: NaiveDate,
        employee_code: EmployeeCode,
        status: AttendanceStatus,
        mut punch_logs: Vec<PunchLog>,
        mut intervals: Vec<WorkInterval>,
        confidence: Confidence,
        has_ambiguous_punches: bool,
    ) -> Self {
        punch_logs.sort_by_key(PunchLog::time);
        intervals.sort_by_key(WorkInterval::check_in);
        Self {
            date,
            employee_code,
            status,
            punch_logs,
            intervals,
            confidence,
            has_ambiguous_punches,
        }
    }

    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    pub const fn employee_code(&self) -> &EmployeeCode {
        &self.employee_code
    }

    pub const fn status(&self) -> AttendanceStatus {
        self.status
    }

    pub fn punch_logs(&self) -> &[PunchLog] {
        &self.punch_logs
    }

    pub fn intervals(&self) -> &[WorkInterval] {
        &self.intervals
    }

    pub const fn confidence(&self) -> Confidence {
        self.confidence
    }

    pub const fn has_ambiguous_punches(&self) -> bool {
        self.has_ambiguous_punches
    }

    /// Returns a copy of this record with a different status.
    #[must_use]
    pub fn with_status(&self, status: AttendanceStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    /// Hours worked: the sum of work intervals, breaks excluded.
    pub fn calculate_total_hours(&self) -> f64 {
        self.intervals
            .iter()
            .filter(|interval| interval.is_work())
            .map(WorkInterval::duration_in_hours)
            .sum()
    }

    /// Hours spent on break.
    pub fn calculate_break_hours(&self) -> f64 {
        self.intervals
            .iter()
            .filter(|interval| interval.is_break())
            .map(WorkInterval::duration_in_hours)
            .sum()
    }

    /// Total worked hours as `HH:MM`.
    pub fn total_hours_formatted(&self) -> String {
        format_hours(self.calculate_total_hours())
    }

    /// Whether the first punch of the day falls after `threshold`.
    ///
    /// A day without punches is never late.
    pub fn is_late(&self, threshold: NaiveTime) -> bool {
        self.punch_logs
            .first()
            .is_some_and(|punch| is_after_threshold(punch.time().time(), threshold))
    }

    pub const fn is_present(&self) -> bool {
        self.status.is_present()
    }

    /// Time of the first `in` punch, paired or not.
    pub fn check_in_time(&self) -> Option<NaiveDateTime> {
        self.punch_logs
            .iter()
            .find(|punch| punch.direction() == Direction::In)
            .map(PunchLog::time)
    }

    /// Time of the last `out` punch, paired or not.
    pub fn check_out_time(&self) -> Option<NaiveDateTime> {
        self.punch_logs
            .iter()
            .rev()
            .find(|punch| punch.direction() == Direction::Out)
            .map(PunchLog::time)
    }
}
