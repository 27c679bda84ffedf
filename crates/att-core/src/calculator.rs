//! Cross-day aggregation over reconciled attendance.

use chrono::NaiveTime;
use serde::Serialize;

use crate::attendance::{Attendance, default_late_threshold};
use crate::status::AttendanceStatus;
use crate::timefmt::{self, minutes_since_midnight};
use crate::types::DateRange;

/// Totals, averages, rates and counts over a set of days.
///
/// Every operation accepts an empty slice and returns a neutral value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendanceCalculator {
    /// Used by [`count_late_days`](Self::count_late_days). Default: 09:00.
    pub late_threshold: NaiveTime,
}

impl Default for AttendanceCalculator {
    fn default() -> Self {
        Self {
            late_threshold: default_late_threshold(),
        }
    }
}

/// Aggregate view of a set of days.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceSummary {
    pub range: Option<DateRange>,
    pub total_days: usize,
    pub present_days: usize,
    pub absent_days: usize,
    pub late_days: usize,
    pub sick_days: usize,
    pub vacation_days: usize,
    pub ambiguous_days: usize,
    pub total_hours: f64,
    pub average_hours: f64,
    pub total_break_hours: f64,
    pub attendance_rate: u32,
    pub average_check_in: Option<NaiveTime>,
    pub average_check_out: Option<NaiveTime>,
}

impl AttendanceSummary {
    pub fn total_hours_formatted(&self) -> String {
        timefmt::format_hours(self.total_hours)
    }

    pub fn average_hours_formatted(&self) -> String {
        timefmt::format_hours(self.average_hours)
    }
}

impl AttendanceCalculator {
    pub const fn new(late_threshold: NaiveTime) -> Self {
        Self { late_threshold }
    }

    pub fn calculate_total_work_hours(&self, attendances: &[Attendance]) -> f64 {
        attendances.iter().map(Attendance::calculate_total_hours).sum()
    }

    /// Percentage of days present (late counts as present), rounded half up.
    pub fn calculate_attendance_rate(&self, attendances: &[Attendance]) -> u32 {
        let total = attendances.len();
        if total == 0 {
            return 0;
        }
        let present = attendances.iter().filter(|a| a.is_present()).count();
        let rate = (present * 200 + total) / (total * 2);
        u32::try_from(rate).unwrap_or(100)
    }

    pub fn count_late_days(&self, attendances: &[Attendance]) -> usize {
        attendances
            .iter()
            .filter(|a| a.is_late(self.late_threshold))
            .count()
    }

    /// Days not present, which includes leave and ambiguous days.
    pub fn count_absent_days(&self, attendances: &[Attendance]) -> usize {
        attendances.iter().filter(|a| !a.is_present()).count()
    }

    /// Mean check-in time of day over days that have one.
    pub fn calculate_average_check_in(&self, attendances: &[Attendance]) -> Option<NaiveTime> {
        average_time_of_day(attendances.iter().filter_map(Attendance::check_in_time).map(|t| t.time()))
    }

    /// Mean check-out time of day over days that have one.
    pub fn calculate_average_check_out(&self, attendances: &[Attendance]) -> Option<NaiveTime> {
        average_time_of_day(attendances.iter().filter_map(Attendance::check_out_time).map(|t| t.time()))
    }

    pub fn calculate_total_break_time(&self, attendances: &[Attendance]) -> f64 {
        attendances.iter().map(Attendance::calculate_break_hours).sum()
    }

    pub fn format_hours(&self, hours: f64) -> String {
        timefmt::format_hours(hours)
    }

    pub fn format_time(&self, time: Option<NaiveTime>) -> String {
        timefmt::format_time(time)
    }

    /// Builds a summary, optionally restricted to days inside `range`.
    #[allow(clippy::cast_precision_loss)]
    pub fn summarize(&self, attendances: &[Attendance], range: Option<DateRange>) -> AttendanceSummary {
        let selected: Vec<Attendance>;
        let days = match range {
            Some(range) => {
                selected = attendances
                    .iter()
                    .filter(|a| range.contains(a.date()))
                    .cloned()
                    .collect();
                selected.as_slice()
            }
            None => attendances,
        };

        let count_status =
            |status: AttendanceStatus| days.iter().filter(|a| a.status() == status).count();

        let total_hours = self.calculate_total_work_hours(days);
        let average_hours = if days.is_empty() {
            0.0
        } else {
            total_hours / days.len() as f64
        };

        AttendanceSummary {
            range,
            total_days: days.len(),
            present_days: days.iter().filter(|a| a.is_present()).count(),
            absent_days: self.count_absent_days(days),
            late_days: self.count_late_days(days),
            sick_days: count_status(AttendanceStatus::Sick),
            vacation_days: count_status(AttendanceStatus::Vacation),
            ambiguous_days: days.iter().filter(|a| a.has_ambiguous_punches()).count(),
            total_hours,
            average_hours,
            total_break_hours: self.calculate_total_break_time(days),
            attendance_rate: self.calculate_attendance_rate(days),
            average_check_in: self.calculate_average_check_in(days),
            average_check_out: self.calculate_average_check_out(days),
        }
    }
}

/// Floor of the mean minutes since midnight.
fn average_time_of_day(times: impl Iterator<Item = NaiveTime>) -> Option<NaiveTime> {
    let (sum, count) = times.fold((0_u64, 0_u64), |(sum, count), time| {
        (sum + u64::from(minutes_since_midnight(time)), count + 1)
    });
    if count == 0 {
        return None;
    }
    let average = u32::try_from(sum / count).ok()?;
    NaiveTime::from_hms_opt(average / 60, average % 60, 0)
}
