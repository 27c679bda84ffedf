//! Core domain logic for attendance reconciliation.
//!
//! This crate contains the fundamental types and logic for:
//! - Reconciliation: turning raw device punches into a daily attendance record
//! - Validation: flagging days that need a human to review them
//! - Aggregation: totals, averages and rates across many days
//! - Use cases: fetching, refreshing and mapping attendance through storage traits

mod attendance;
pub mod calculator;
pub mod dto;
mod employee;
mod interval;
mod punch;
pub mod reconcile;
pub mod repository;
mod status;
pub mod timefmt;
mod types;
pub mod usecase;
pub mod validator;

pub use attendance::{Attendance, default_late_threshold};
pub use calculator::{AttendanceCalculator, AttendanceSummary};
pub use dto::{AttendanceDto, AttendanceSummaryDto, DtoError, PunchLogDto, WorkIntervalDto};
pub use employee::Employee;
pub use interval::WorkInterval;
pub use punch::{PunchLog, PunchRecord, RawPunch};
pub use reconcile::{ReconcileConfig, Reconciliation, reconcile, reconcile_detailed, reconcile_existing};
pub use repository::{AttendanceRepository, PunchSource, Subscribers, Subscription, UpdateCallback};
pub use status::AttendanceStatus;
pub use types::{
    Confidence, DateRange, Direction, EMPLOYEE_CODE_MAX_LEN, EmployeeCode, IntervalKind,
    ValidationError,
};
pub use usecase::{
    AttendanceReport, FreshnessTracker, GetAttendance, RefreshAttendance, RefreshOutcome,
    UseCaseError,
};
pub use validator::{AttendanceValidator, ValidationIssue, ValidationReport};
