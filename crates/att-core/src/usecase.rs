//! Application-facing operations: fetch, reconcile, map.

use std::collections::HashMap;
use std::error::Error as StdError;

use chrono::NaiveDate;
use rayon::prelude::*;
use thiserror::Error;

use crate::attendance::Attendance;
use crate::calculator::AttendanceCalculator;
use crate::dto::{AttendanceDto, AttendanceSummaryDto};
use crate::reconcile::{ReconcileConfig, reconcile, reconcile_existing};
use crate::repository::{AttendanceRepository, PunchSource};
use crate::types::{DateRange, EmployeeCode};
use crate::validator::AttendanceValidator;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Errors from use cases.
#[derive(Debug, Error)]
pub enum UseCaseError {
    #[error("not authorized to access attendance for {code}")]
    Unauthorized { code: EmployeeCode },

    #[error("attendance repository failed")]
    Repository(#[source] BoxError),

    #[error("punch source failed")]
    PunchSource(#[source] BoxError),
}

impl UseCaseError {
    fn repository<E: StdError + Send + Sync + 'static>(error: E) -> Self {
        Self::Repository(Box::new(error))
    }

    fn punch_source<E: StdError + Send + Sync + 'static>(error: E) -> Self {
        Self::PunchSource(Box::new(error))
    }
}

/// Days and summary for one employee over a range.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AttendanceReport {
    pub employee_code: EmployeeCode,
    pub days: Vec<AttendanceDto>,
    pub summary: AttendanceSummaryDto,
}

/// Reads stored attendance and maps it for display.
#[derive(Debug)]
pub struct GetAttendance<'a, R> {
    repository: &'a R,
    validator: AttendanceValidator,
    calculator: AttendanceCalculator,
}

impl<'a, R: AttendanceRepository> GetAttendance<'a, R> {
    pub const fn new(
        repository: &'a R,
        validator: AttendanceValidator,
        calculator: AttendanceCalculator,
    ) -> Self {
        Self {
            repository,
            validator,
            calculator,
        }
    }

    /// Stored days in `range` plus their summary.
    ///
    /// `authorized` is the caller's permission for `code`, decided elsewhere.
    pub fn execute(
        &self,
        code: &EmployeeCode,
        range: DateRange,
        authorized: bool,
    ) -> Result<AttendanceReport, UseCaseError> {
        ensure_authorized(code, authorized)?;

        let attendances = self
            .repository
            .get_by_employee_code(code, range)
            .map_err(UseCaseError::repository)?;
        let summary = self.calculator.summarize(&attendances, Some(range));

        tracing::info!(
            employee = %code,
            %range,
            days = attendances.len(),
            rate = summary.attendance_rate,
            "loaded attendance"
        );

        Ok(AttendanceReport {
            employee_code: code.clone(),
            days: attendances
                .iter()
                .map(|a| AttendanceDto::from_attendance(a, &self.validator))
                .collect(),
            summary: AttendanceSummaryDto::from(&summary),
        })
    }

    /// A single stored day, if any.
    pub fn day(
        &self,
        code: &EmployeeCode,
        date: NaiveDate,
        authorized: bool,
    ) -> Result<Option<AttendanceDto>, UseCaseError> {
        ensure_authorized(code, authorized)?;
        let attendance = self
            .repository
            .get_by_date(code, date)
            .map_err(UseCaseError::repository)?;
        Ok(attendance.map(|a| AttendanceDto::from_attendance(&a, &self.validator)))
    }
}

/// Counts from a refresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshOutcome {
    pub days: usize,
    pub punches: usize,
    pub ambiguous_days: usize,
    pub leave_days_kept: usize,
    pub attendances: Vec<Attendance>,
}

/// Re-reconciles a range of days from raw punches and stores the results.
///
/// The store is both the punch source and the repository: punches are read
/// first, then results are written back.
#[derive(Debug)]
pub struct RefreshAttendance<'a, T> {
    store: &'a mut T,
    config: ReconcileConfig,
}

impl<'a, T> RefreshAttendance<'a, T>
where
    T: PunchSource + AttendanceRepository,
{
    pub const fn new(store: &'a mut T, config: ReconcileConfig) -> Self {
        Self { store, config }
    }

    /// Reconciles every day in `range`; days are processed in parallel.
    ///
    /// Sick and vacation statuses already stored are preserved.
    pub fn execute(
        &mut self,
        code: &EmployeeCode,
        range: DateRange,
    ) -> Result<RefreshOutcome, UseCaseError> {
        let days = self
            .store
            .punches_for_range(code, range)
            .map_err(UseCaseError::punch_source)?;
        let existing: HashMap<NaiveDate, Attendance> = self
            .store
            .get_by_employee_code(code, range)
            .map_err(UseCaseError::repository)?
            .into_iter()
            .map(|a| (a.date(), a))
            .collect();

        let config = self.config;
        let mut attendances: Vec<Attendance> = days
            .par_iter()
            .map(|(date, punches)| match existing.get(date) {
                Some(previous) => reconcile_existing(previous, punches, &config),
                None => reconcile(*date, code, punches, &config),
            })
            .collect();
        attendances.sort_by_key(Attendance::date);

        for attendance in &attendances {
            self.store
                .save(attendance)
                .map_err(UseCaseError::repository)?;
        }

        let outcome = RefreshOutcome {
            days: attendances.len(),
            punches: days.iter().map(|(_, punches)| punches.len()).sum(),
            ambiguous_days: attendances
                .iter()
                .filter(|a| a.has_ambiguous_punches())
                .count(),
            leave_days_kept: attendances.iter().filter(|a| a.status().is_leave()).count(),
            attendances,
        };

        tracing::info!(
            employee = %code,
            %range,
            days = outcome.days,
            punches = outcome.punches,
            ambiguous = outcome.ambiguous_days,
            "refreshed attendance"
        );
        Ok(outcome)
    }
}

/// Detects new punches by comparing counts between polls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FreshnessTracker {
    last_count: Option<usize>,
}

impl FreshnessTracker {
    pub const fn new() -> Self {
        Self { last_count: None }
    }

    /// Records `count` and returns how many punches arrived since the last
    /// observation. The first observation sets the baseline and returns 0; a
    /// shrinking count (rows deleted) also returns 0.
    pub fn observe(&mut self, count: usize) -> usize {
        let delta = self
            .last_count
            .map_or(0, |previous| count.saturating_sub(previous));
        self.last_count = Some(count);
        delta
    }

    /// Reads the current count from `source` and observes it.
    pub fn poll<S: PunchSource>(
        &mut self,
        source: &S,
        code: &EmployeeCode,
        range: DateRange,
    ) -> Result<usize, UseCaseError> {
        let count = source
            .punch_count(code, range)
            .map_err(UseCaseError::punch_source)?;
        let delta = self.observe(count);
        if delta > 0 {
            tracing::debug!(employee = %code, delta, "new punches arrived");
        }
        Ok(delta)
    }

    pub const fn last_count(&self) -> Option<usize> {
        self.last_count
    }
}

fn ensure_authorized(code: &EmployeeCode, authorized: bool) -> Result<(), UseCaseError> {
    if authorized {
        Ok(())
    } else {
        Err(UseCaseError::Unauthorized { code: code.clone() })
    }
}
