//! Flat, serializable views of attendance for transport and storage.
//!
//! Display times are `HH:MM` (24-hour). Punches and intervals also carry their
//! full timestamps, which [`AttendanceDto::into_domain`] rebuilds from, so
//! seconds and shifts past midnight survive storage.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::attendance::Attendance;
use crate::calculator::AttendanceSummary;
use crate::interval::WorkInterval;
use crate::punch::PunchLog;
use crate::status::AttendanceStatus;
use crate::timefmt::format_time;
use crate::types::{Confidence, Direction, EmployeeCode, IntervalKind, ValidationError};
use crate::validator::AttendanceValidator;

/// Errors converting a DTO back into domain objects.
#[derive(Debug, Error)]
pub enum DtoError {
    #[error("invalid employee code: {0}")]
    EmployeeCode(#[source] ValidationError),

    #[error("interval {index}: {source}")]
    Interval {
        index: usize,
        #[source]
        source: ValidationError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunchLogDto {
    pub time: String,
    pub direction: Direction,
    pub device_id: String,
    pub confidence: Confidence,
    pub inferred: bool,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkIntervalDto {
    pub check_in: String,
    pub check_out: String,
    pub duration: String,
    pub kind: IntervalKind,
    pub check_in_at: NaiveDateTime,
    pub check_out_at: NaiveDateTime,
}

/// One reconciled day, ready for display or persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceDto {
    pub date: NaiveDate,
    pub employee_code: String,
    pub status: AttendanceStatus,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub total_hours: String,
    pub confidence: Confidence,
    pub has_ambiguous_punches: bool,
    pub needs_review: bool,
    pub intervals: Vec<WorkIntervalDto>,
    pub punch_logs: Vec<PunchLogDto>,
}

impl From<&PunchLog> for PunchLogDto {
    fn from(log: &PunchLog) -> Self {
        Self {
            time: log.time_formatted(),
            direction: log.direction(),
            device_id: log.device_id().to_string(),
            confidence: log.confidence(),
            inferred: log.inferred(),
            timestamp: log.time(),
        }
    }
}

impl From<&WorkInterval> for WorkIntervalDto {
    fn from(interval: &WorkInterval) -> Self {
        Self {
            check_in: hh_mm(interval.check_in()),
            check_out: hh_mm(interval.check_out()),
            duration: interval.duration_formatted(),
            kind: interval.kind(),
            check_in_at: interval.check_in(),
            check_out_at: interval.check_out(),
        }
    }
}

impl AttendanceDto {
    /// Maps a day, deciding `needs_review` with `validator`.
    pub fn from_attendance(attendance: &Attendance, validator: &AttendanceValidator) -> Self {
        Self {
            date: attendance.date(),
            employee_code: attendance.employee_code().to_string(),
            status: attendance.status(),
            check_in: attendance.check_in_time().map(hh_mm),
            check_out: attendance.check_out_time().map(hh_mm),
            total_hours: attendance.total_hours_formatted(),
            confidence: attendance.confidence(),
            has_ambiguous_punches: attendance.has_ambiguous_punches(),
            needs_review: validator.needs_review(attendance),
            intervals: attendance.intervals().iter().map(Into::into).collect(),
            punch_logs: attendance.punch_logs().iter().map(Into::into).collect(),
        }
    }

    /// Rebuilds the aggregate from the full timestamps; the `HH:MM` fields are
    /// display only.
    pub fn into_domain(&self) -> Result<Attendance, DtoError> {
        let employee_code =
            EmployeeCode::new(&self.employee_code).map_err(DtoError::EmployeeCode)?;

        let punch_logs = self
            .punch_logs
            .iter()
            .map(|punch| {
                PunchLog::new(
                    punch.timestamp,
                    punch.direction,
                    punch.device_id.clone(),
                    punch.confidence,
                    punch.inferred,
                )
            })
            .collect();

        let intervals = self
            .intervals
            .iter()
            .enumerate()
            .map(|(index, interval)| {
                WorkInterval::new(interval.check_in_at, interval.check_out_at, interval.kind)
                    .map_err(|source| DtoError::Interval { index, source })
            })
            .collect::<Result<Vec<_>, DtoError>>()?;

        Ok(Attendance::new(
            self.date,
            employee_code,
            self.status,
            punch_logs,
            intervals,
            self.confidence,
            self.has_ambiguous_punches,
        ))
    }
}

/// Summary figures with hours and times pre-formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSummaryDto {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub total_days: usize,
    pub present_days: usize,
    pub absent_days: usize,
    pub late_days: usize,
    pub sick_days: usize,
    pub vacation_days: usize,
    pub ambiguous_days: usize,
    pub total_hours: String,
    pub average_hours: String,
    pub total_break_hours: String,
    pub attendance_rate: u32,
    pub average_check_in: Option<String>,
    pub average_check_out: Option<String>,
}

impl From<&AttendanceSummary> for AttendanceSummaryDto {
    fn from(summary: &AttendanceSummary) -> Self {
        let time = |t: Option<NaiveTime>| t.map(|t| format_time(Some(t)));
        Self {
            from: summary.range.map(|r| r.start()),
            to: summary.range.map(|r| r.end()),
            total_days: summary.total_days,
            present_days: summary.present_days,
            absent_days: summary.absent_days,
            late_days: summary.late_days,
            sick_days: summary.sick_days,
            vacation_days: summary.vacation_days,
            ambiguous_days: summary.ambiguous_days,
            total_hours: summary.total_hours_formatted(),
            average_hours: summary.average_hours_formatted(),
            total_break_hours: crate::timefmt::format_hours(summary.total_break_hours),
            attendance_rate: summary.attendance_rate,
            average_check_in: time(summary.average_check_in),
            average_check_out: time(summary.average_check_out),
        }
    }
}

fn hh_mm(time: NaiveDateTime) -> String {
    format_time(Some(time.time()))
}
