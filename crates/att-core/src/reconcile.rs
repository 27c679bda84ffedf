//! Punch reconciliation algorithm.
//!
//! Turns one day's raw, possibly unordered and unreliable punches into an
//! [`Attendance`] record:
//! 1. Pairing - `in` punches are matched with the next `out`, with `break`
//!    punches splitting work into work and break intervals
//! 2. Classification - status from the first check-in against a late threshold
//! 3. Trust - confidence and ambiguity derived from how cleanly pairing went

use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveTime};

use crate::attendance::{Attendance, default_late_threshold, is_after_threshold};
use crate::interval::WorkInterval;
use crate::punch::{PunchLog, RawPunch};
use crate::status::AttendanceStatus;
use crate::types::{Confidence, Direction, EmployeeCode, IntervalKind, ValidationError};

/// Configuration for reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileConfig {
    /// A check-in strictly after this time of day (to the minute) is late.
    /// Default: 09:00.
    pub late_threshold: NaiveTime,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            late_threshold: default_late_threshold(),
        }
    }
}

/// A raw punch that failed validation and was left out of pairing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedPunch {
    /// Position of the punch in the input slice.
    pub index: usize,
    pub error: ValidationError,
}

/// Result of reconciling a day, with the diagnostics behind the flags.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub attendance: Attendance,

    /// Punches that could not be paired into an interval.
    pub unpaired: Vec<PunchLog>,

    /// Raw punches excluded because they failed validation.
    pub rejected: Vec<RejectedPunch>,

    /// Number of exact duplicates (same time and direction) dropped from pairing.
    pub duplicates: usize,

    /// Number of punches timestamped on a calendar day other than the one
    /// reconciled. They are paired (an overnight `out` closes the shift) but
    /// the day is flagged.
    pub off_day: usize,
}

/// Where the walk over sorted punches currently stands.
#[derive(Debug, Clone, Copy)]
enum PairingState {
    Idle,
    /// Work is open since the punch at this index.
    Working(usize),
    /// A break is open since the punch at this index.
    OnBreak(usize),
}

#[derive(Debug, Default)]
struct Pairing {
    intervals: Vec<WorkInterval>,
    used: Vec<bool>,
    unpaired: Vec<usize>,
}

impl Pairing {
    fn new(len: usize) -> Self {
        Self {
            intervals: Vec::new(),
            used: vec![false; len],
            unpaired: Vec::new(),
        }
    }

    /// Closes `[start, end)` as an interval. A pair that does not move
    /// forward in time leaves both endpoints unpaired.
    fn close(&mut self, logs: &[PunchLog], start: usize, end: usize, kind: IntervalKind) -> bool {
        match WorkInterval::new(logs[start].time(), logs[end].time(), kind) {
            Ok(interval) => {
                self.intervals.push(interval);
                self.used[start] = true;
                self.used[end] = true;
                true
            }
            Err(error) => {
                tracing::debug!(%error, "discarding non-positive interval");
                self.unpaired.push(start);
                self.unpaired.push(end);
                false
            }
        }
    }
}

/// Reconcile one employee's punches for one day.
///
/// Never fails: malformed punches, odd counts, duplicates and out-of-order
/// input all degrade into `has_ambiguous_punches` and a lower confidence
/// rather than an error.
pub fn reconcile<P: RawPunch>(
    date: NaiveDate,
    employee_code: &EmployeeCode,
    punches: &[P],
    config: &ReconcileConfig,
) -> Attendance {
    reconcile_detailed(date, employee_code, punches, config).attendance
}

/// Re-reconcile an existing record against a fresh punch snapshot.
///
/// Leave statuses (sick, vacation) are owned by the leave system and are
/// carried over untouched; everything else is derived again.
pub fn reconcile_existing<P: RawPunch>(
    existing: &Attendance,
    punches: &[P],
    config: &ReconcileConfig,
) -> Attendance {
    let attendance = reconcile(existing.date(), existing.employee_code(), punches, config);
    if existing.status().is_leave() {
        attendance.with_status(existing.status())
    } else {
        attendance
    }
}

/// Reconcile a day and keep the diagnostics.
///
/// # Algorithm
///
/// 1. Validate each raw punch; failures are recorded and excluded
/// 2. Sort by time, breaking ties by direction (`in`, `break`, `out`) then the
///    remaining fields, so any permutation of the input gives the same result.
///    Ties deliberately do not fall back to input order.
/// 3. Mark exact duplicates (same time and direction); only the first copy
///    takes part in pairing
/// 4. Walk the punches:
///    - `in` opens work; an `in` while work is open leaves the earlier `in`
///      unpaired and the later one becomes the start
///    - `out` closes open work (or an open break); with nothing open it is unpaired
///    - `break` closes open work and opens a break, which the next `in` or
///      `break` closes before work resumes; with nothing open it is unpaired
///    - anything still open at the end is unpaired
/// 5. Check-in is the first `in`, check-out the last `out`, paired or not
/// 6. Status: no punches is absent; punches without any `in` is ambiguous;
///    otherwise late or present by the threshold
/// 7. Confidence: low with any unpaired or rejected punch or any low punch
///    used; medium with any medium or inferred punch used, or any punch dated
///    on another day; else high
/// 8. Ambiguous with any unpaired, rejected, duplicate or off-day punch
pub fn reconcile_detailed<P: RawPunch>(
    date: NaiveDate,
    employee_code: &EmployeeCode,
    punches: &[P],
    config: &ReconcileConfig,
) -> Reconciliation {
    let mut rejected = Vec::new();
    let mut logs = Vec::with_capacity(punches.len());
    for (index, raw) in punches.iter().enumerate() {
        match PunchLog::parse(raw, Some(date)) {
            Ok(log) => logs.push(log),
            Err(error) => {
                tracing::warn!(
                    employee = %employee_code,
                    %date,
                    index,
                    %error,
                    "rejected malformed punch"
                );
                rejected.push(RejectedPunch { index, error });
            }
        }
    }

    logs.sort_by(compare_punches);

    let off_day = logs.iter().filter(|log| log.time().date() != date).count();
    if off_day > 0 {
        tracing::warn!(
            employee = %employee_code,
            %date,
            off_day,
            "punches dated on another day"
        );
    }

    let is_duplicate: Vec<bool> = (0..logs.len())
        .map(|i| {
            logs[..i]
                .iter()
                .rev()
                .take_while(|earlier| earlier.time() == logs[i].time())
                .any(|earlier| earlier.is_duplicate_of(&logs[i]))
        })
        .collect();
    let duplicates = is_duplicate.iter().filter(|d| **d).count();

    let mut pairing = Pairing::new(logs.len());
    let mut state = PairingState::Idle;

    for (i, punch) in logs.iter().enumerate() {
        if is_duplicate[i] {
            continue;
        }
        state = match (state, punch.direction()) {
            (PairingState::Idle, Direction::In) => PairingState::Working(i),
            (PairingState::Working(start), Direction::In) => {
                pairing.unpaired.push(start);
                PairingState::Working(i)
            }
            (PairingState::Working(start), Direction::Out) => {
                pairing.close(&logs, start, i, IntervalKind::Work);
                PairingState::Idle
            }
            (PairingState::Working(start), Direction::Break) => {
                if pairing.close(&logs, start, i, IntervalKind::Work) {
                    PairingState::OnBreak(i)
                } else {
                    PairingState::Idle
                }
            }
            (PairingState::OnBreak(start), Direction::In | Direction::Break) => {
                if pairing.close(&logs, start, i, IntervalKind::Break) {
                    PairingState::Working(i)
                } else {
                    PairingState::Idle
                }
            }
            (PairingState::OnBreak(start), Direction::Out) => {
                pairing.close(&logs, start, i, IntervalKind::Break);
                PairingState::Idle
            }
            (PairingState::Idle, Direction::Out | Direction::Break) => {
                pairing.unpaired.push(i);
                PairingState::Idle
            }
        };
    }
    match state {
        PairingState::Working(start) | PairingState::OnBreak(start) => {
            pairing.unpaired.push(start);
        }
        PairingState::Idle => {}
    }
    pairing.unpaired.sort_unstable();
    pairing.unpaired.dedup();

    let confidence = if !pairing.unpaired.is_empty() || !rejected.is_empty() {
        Confidence::Low
    } else {
        logs.iter()
            .zip(&pairing.used)
            .filter(|(_, used)| **used)
            .map(|(punch, _)| effective_confidence(punch))
            .min()
            .unwrap_or(Confidence::High)
            .min(if off_day > 0 {
                Confidence::Medium
            } else {
                Confidence::High
            })
    };

    let has_ambiguous_punches =
        !pairing.unpaired.is_empty() || !rejected.is_empty() || duplicates > 0 || off_day > 0;

    let check_in = logs
        .iter()
        .find(|punch| punch.direction() == Direction::In)
        .map(PunchLog::time);
    let status = match check_in {
        _ if punches.is_empty() => AttendanceStatus::Absent,
        None => AttendanceStatus::Ambiguous,
        Some(time) if is_after_threshold(time.time(), config.late_threshold) => {
            AttendanceStatus::Late
        }
        Some(_) => AttendanceStatus::Present,
    };

    let unpaired: Vec<PunchLog> = pairing
        .unpaired
        .iter()
        .map(|&i| logs[i].clone())
        .collect();

    tracing::debug!(
        employee = %employee_code,
        %date,
        punches = logs.len(),
        intervals = pairing.intervals.len(),
        unpaired = unpaired.len(),
        rejected = rejected.len(),
        duplicates,
        off_day,
        %status,
        %confidence,
        "reconciled day"
    );

    let attendance = Attendance::new(
        date,
        employee_code.clone(),
        status,
        logs,
        pairing.intervals,
        confidence,
        has_ambiguous_punches,
    );

    Reconciliation {
        attendance,
        unpaired,
        rejected,
        duplicates,
        off_day,
    }
}

/// A punch's own confidence, capped at medium when it was inferred.
fn effective_confidence(punch: &PunchLog) -> Confidence {
    if punch.inferred() {
        punch.confidence().min(Confidence::Medium)
    } else {
        punch.confidence()
    }
}

const fn direction_rank(direction: Direction) -> u8 {
    match direction {
        Direction::In => 0,
        Direction::Break => 1,
        Direction::Out => 2,
    }
}

/// Total order over punches: time first, then direction, then provenance.
fn compare_punches(a: &PunchLog, b: &PunchLog) -> Ordering {
    a.time()
        .cmp(&b.time())
        .then_with(|| direction_rank(a.direction()).cmp(&direction_rank(b.direction())))
        .then_with(|| a.device_id().cmp(b.device_id()))
        .then_with(|| b.confidence().cmp(&a.confidence()))
        .then_with(|| a.inferred().cmp(&b.inferred()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::punch::PunchRecord;
    use chrono::NaiveDateTime;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 18).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        day().and_hms_opt(h, m, 0).unwrap()
    }

    fn code() -> EmployeeCode {
        EmployeeCode::new("EMP001").unwrap()
    }

    fn punch(time: &str, direction: Direction) -> PunchRecord {
        PunchRecord::observed(format!("2025-10-18T{time}:00"), direction, "DEVICE-001")
    }

    fn with_confidence(mut record: PunchRecord, confidence: &str) -> PunchRecord {
        record.confidence = confidence.to_string();
        record
    }

    fn inferred(mut record: PunchRecord) -> PunchRecord {
        record.inferred = true;
        record
    }

    fn run(punches: &[PunchRecord]) -> Reconciliation {
        reconcile_detailed(day(), &code(), punches, &ReconcileConfig::default())
    }

    #[test]
    fn clean_day_pairs_in_and_out() {
        let result = run(&[punch("09:00", Direction::In), punch("17:00", Direction::Out)]);
        let attendance = &result.attendance;

        assert_eq!(attendance.intervals().len(), 1);
        let interval = attendance.intervals()[0];
        assert_eq!(interval.check_in(), at(9, 0));
        assert_eq!(interval.check_out(), at(17, 0));
        assert!(interval.is_work());
        assert_eq!(attendance.check_in_time(), Some(at(9, 0)));
        assert_eq!(attendance.check_out_time(), Some(at(17, 0)));
        assert_eq!(attendance.total_hours_formatted(), "08:00");
        assert_eq!(attendance.status(), AttendanceStatus::Present);
        assert_eq!(attendance.confidence(), Confidence::High);
        assert!(!attendance.has_ambiguous_punches());
    }

    #[test]
    fn check_in_after_threshold_is_late() {
        let attendance = reconcile(
            day(),
            &code(),
            &[punch("09:15", Direction::In), punch("17:30", Direction::Out)],
            &ReconcileConfig::default(),
        );
        assert_eq!(attendance.status(), AttendanceStatus::Late);
        assert!(attendance.is_late(default_late_threshold()));
    }

    #[test]
    fn check_in_at_threshold_is_on_time() {
        let attendance = reconcile(
            day(),
            &code(),
            &[punch("09:00", Direction::In), punch("17:00", Direction::Out)],
            &ReconcileConfig::default(),
        );
        assert_eq!(attendance.status(), AttendanceStatus::Present);
    }

    #[test]
    fn custom_threshold_is_respected() {
        let config = ReconcileConfig {
            late_threshold: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        };
        let attendance = reconcile(
            day(),
            &code(),
            &[punch("09:15", Direction::In), punch("17:30", Direction::Out)],
            &config,
        );
        assert_eq!(attendance.status(), AttendanceStatus::Present);
    }

    #[test]
    fn no_punches_is_absent() {
        let punches: Vec<PunchRecord> = Vec::new();
        let result = run(&punches);
        let attendance = &result.attendance;

        assert_eq!(attendance.status(), AttendanceStatus::Absent);
        assert!(attendance.calculate_total_hours().abs() < f64::EPSILON);
        assert_eq!(attendance.check_in_time(), None);
        assert!(attendance.intervals().is_empty());
        assert!(!attendance.has_ambiguous_punches());
    }

    #[test]
    fn double_in_keeps_latest_and_flags_ambiguity() {
        let result = run(&[
            punch("09:00", Direction::In),
            punch("09:05", Direction::In),
            punch("17:00", Direction::Out),
        ]);
        let attendance = &result.attendance;

        assert!(attendance.has_ambiguous_punches());
        assert_eq!(attendance.intervals().len(), 1);
        assert_eq!(attendance.intervals()[0].check_in(), at(9, 5));
        assert_eq!(attendance.intervals()[0].check_out(), at(17, 0));
        assert!(attendance.confidence() <= Confidence::Medium);
        assert_eq!(result.unpaired.len(), 1);
        assert_eq!(result.unpaired[0].time(), at(9, 0));
        // The unpaired in still counts as the day's check-in
        assert_eq!(attendance.check_in_time(), Some(at(9, 0)));
    }

    #[test]
    fn out_without_in_is_unpaired() {
        let result = run(&[
            punch("08:00", Direction::Out),
            punch("09:00", Direction::In),
            punch("17:00", Direction::Out),
        ]);
        assert_eq!(result.unpaired.len(), 1);
        assert_eq!(result.unpaired[0].direction(), Direction::Out);
        assert_eq!(result.attendance.intervals().len(), 1);
        assert_eq!(result.attendance.confidence(), Confidence::Low);
    }

    #[test]
    fn trailing_in_is_unpaired() {
        let result = run(&[
            punch("09:00", Direction::In),
            punch("12:00", Direction::Out),
            punch("13:00", Direction::In),
        ]);
        assert_eq!(result.attendance.intervals().len(), 1);
        assert_eq!(result.unpaired.len(), 1);
        assert_eq!(result.unpaired[0].time(), at(13, 0));
        assert!(result.attendance.has_ambiguous_punches());
    }

    #[test]
    fn unordered_input_is_sorted_first() {
        let ordered = run(&[
            punch("09:00", Direction::In),
            punch("12:00", Direction::Out),
            punch("13:00", Direction::In),
            punch("17:00", Direction::Out),
        ]);
        let shuffled = run(&[
            punch("13:00", Direction::In),
            punch("17:00", Direction::Out),
            punch("09:00", Direction::In),
            punch("12:00", Direction::Out),
        ]);
        assert_eq!(ordered.attendance, shuffled.attendance);
        assert_eq!(ordered.attendance.intervals().len(), 2);
        assert!(!shuffled.attendance.has_ambiguous_punches());
    }

    #[test]
    fn reconcile_is_idempotent_across_permutations() {
        let punches = vec![
            punch("09:00", Direction::In),
            punch("09:00", Direction::Out),
            with_confidence(punch("12:00", Direction::Break), "medium"),
            punch("12:45", Direction::In),
            punch("17:00", Direction::Out),
            punch("17:00", Direction::Out),
        ];
        let baseline = run(&punches).attendance;

        let mut reversed = punches.clone();
        reversed.reverse();
        assert_eq!(run(&reversed).attendance, baseline);

        let mut rotated = punches;
        rotated.rotate_left(2);
        assert_eq!(run(&rotated).attendance, baseline);
        assert_eq!(run(&rotated).attendance, run(&rotated).attendance);
    }

    #[test]
    fn break_splits_work_into_intervals() {
        let result = run(&[
            punch("09:00", Direction::In),
            punch("12:00", Direction::Break),
            punch("12:30", Direction::In),
            punch("17:00", Direction::Out),
        ]);
        let attendance = &result.attendance;
        let kinds: Vec<_> = attendance.intervals().iter().map(WorkInterval::kind).collect();

        assert_eq!(
            kinds,
            vec![IntervalKind::Work, IntervalKind::Break, IntervalKind::Work]
        );
        assert!((attendance.calculate_total_hours() - 7.5).abs() < 1e-9);
        assert!((attendance.calculate_break_hours() - 0.5).abs() < 1e-9);
        assert!(!attendance.has_ambiguous_punches());
        assert_eq!(attendance.confidence(), Confidence::High);
    }

    #[test]
    fn second_break_punch_ends_the_break() {
        let result = run(&[
            punch("09:00", Direction::In),
            punch("12:00", Direction::Break),
            punch("13:00", Direction::Break),
            punch("17:00", Direction::Out),
        ]);
        assert_eq!(result.attendance.intervals().len(), 3);
        assert!((result.attendance.calculate_total_hours() - 7.0).abs() < 1e-9);
        assert!(result.unpaired.is_empty());
    }

    #[test]
    fn out_during_break_closes_the_break() {
        let result = run(&[
            punch("09:00", Direction::In),
            punch("16:00", Direction::Break),
            punch("16:30", Direction::Out),
        ]);
        let intervals = result.attendance.intervals();
        assert_eq!(intervals.len(), 2);
        assert!(intervals[1].is_break());
        assert!(result.unpaired.is_empty());
    }

    #[test]
    fn open_break_at_end_of_day_is_unpaired() {
        let result = run(&[punch("09:00", Direction::In), punch("12:00", Direction::Break)]);
        assert_eq!(result.attendance.intervals().len(), 1);
        assert!(result.attendance.has_ambiguous_punches());
        assert_eq!(result.attendance.confidence(), Confidence::Low);
    }

    #[test]
    fn break_without_open_work_is_unpaired() {
        let result = run(&[punch("12:00", Direction::Break)]);
        assert_eq!(result.unpaired.len(), 1);
        assert_eq!(result.attendance.status(), AttendanceStatus::Ambiguous);
    }

    #[test]
    fn zero_length_pair_is_treated_as_unpaired() {
        let result = run(&[punch("09:00", Direction::In), punch("09:00", Direction::Out)]);
        assert!(result.attendance.intervals().is_empty());
        assert_eq!(result.unpaired.len(), 2);
        assert!(result.attendance.has_ambiguous_punches());
        assert_eq!(result.attendance.confidence(), Confidence::Low);
    }

    #[test]
    fn exact_duplicates_are_flagged_but_not_paired() {
        let result = run(&[
            punch("09:00", Direction::In),
            punch("09:00", Direction::In),
            punch("17:00", Direction::Out),
        ]);
        assert_eq!(result.duplicates, 1);
        assert!(result.unpaired.is_empty());
        assert_eq!(result.attendance.intervals().len(), 1);
        assert!(result.attendance.has_ambiguous_punches());
        assert_eq!(result.attendance.punch_logs().len(), 3);
    }

    #[test]
    fn malformed_punch_is_excluded_not_fatal() {
        let result = run(&[
            punch("09:00", Direction::In),
            PunchRecord::observed("25:99", Direction::In, "DEVICE-002"),
            punch("17:00", Direction::Out),
        ]);
        assert_eq!(result.rejected.len(), 1);
        assert_eq!(result.rejected[0].index, 1);
        assert_eq!(result.attendance.intervals().len(), 1);
        assert_eq!(result.attendance.punch_logs().len(), 2);
        assert!(result.attendance.has_ambiguous_punches());
        assert_eq!(result.attendance.confidence(), Confidence::Low);
        assert_eq!(result.attendance.status(), AttendanceStatus::Present);
    }

    #[test]
    fn all_punches_malformed_is_ambiguous_not_absent() {
        let mut bad = punch("09:00", Direction::In);
        bad.direction = "sideways".to_string();
        let result = run(&[bad]);
        assert_eq!(result.attendance.status(), AttendanceStatus::Ambiguous);
        assert!(result.attendance.has_ambiguous_punches());
    }

    #[test]
    fn punch_from_another_day_is_flagged() {
        let previous_day = PunchRecord::observed("2025-10-17T09:00:00", Direction::In, "DEVICE-001");
        let result = run(&[previous_day, punch("17:00", Direction::Out)]);

        assert_eq!(result.off_day, 1);
        assert!(result.rejected.is_empty());
        assert!(result.attendance.has_ambiguous_punches());
        assert_eq!(result.attendance.confidence(), Confidence::Medium);
    }

    #[test]
    fn overnight_shift_pairs_across_midnight() {
        let out = PunchRecord::observed("2025-10-19T06:00:00", Direction::Out, "DEVICE-001");
        let result = run(&[punch("22:00", Direction::In), out]);
        let attendance = &result.attendance;

        assert_eq!(result.off_day, 1);
        assert!(result.unpaired.is_empty());
        assert_eq!(attendance.intervals().len(), 1);
        assert_eq!(attendance.total_hours_formatted(), "08:00");
        assert_eq!(attendance.status(), AttendanceStatus::Late);
        assert!(attendance.has_ambiguous_punches());
        assert_eq!(attendance.confidence(), Confidence::Medium);
    }

    #[test]
    fn bare_time_is_anchored_on_the_day() {
        let record = PunchRecord::observed("09:00", Direction::In, "DEVICE-001");
        let out = PunchRecord::observed("17:00", Direction::Out, "DEVICE-001");
        let attendance = reconcile(day(), &code(), &[record, out], &ReconcileConfig::default());
        assert_eq!(attendance.check_in_time(), Some(at(9, 0)));
        assert_eq!(attendance.intervals().len(), 1);
    }

    #[test]
    fn medium_or_inferred_punch_lowers_confidence_to_medium() {
        let medium = run(&[
            with_confidence(punch("09:00", Direction::In), "medium"),
            punch("17:00", Direction::Out),
        ]);
        assert_eq!(medium.attendance.confidence(), Confidence::Medium);

        let synthesized = run(&[punch("09:00", Direction::In), inferred(punch("17:00", Direction::Out))]);
        assert_eq!(synthesized.attendance.confidence(), Confidence::Medium);
        assert!(!synthesized.attendance.has_ambiguous_punches());
    }

    #[test]
    fn low_punch_used_in_interval_lowers_confidence_to_low() {
        let result = run(&[
            punch("09:00", Direction::In),
            with_confidence(punch("17:00", Direction::Out), "low"),
        ]);
        assert_eq!(result.attendance.confidence(), Confidence::Low);
        assert!(!result.attendance.has_ambiguous_punches());
    }

    #[test]
    fn interval_count_is_bounded_by_half_the_punches() {
        let cases: Vec<Vec<PunchRecord>> = vec![
            vec![punch("09:00", Direction::In)],
            vec![
                punch("09:00", Direction::In),
                punch("10:00", Direction::In),
                punch("11:00", Direction::Out),
                punch("12:00", Direction::Out),
            ],
            vec![
                punch("09:00", Direction::In),
                punch("10:00", Direction::Out),
                punch("11:00", Direction::In),
                punch("12:00", Direction::Out),
                punch("13:00", Direction::In),
            ],
        ];
        for punches in cases {
            let attendance = run(&punches).attendance;
            assert!(attendance.intervals().len() <= punches.len() / 2);
        }
    }

    #[test]
    fn intervals_never_overlap() {
        let result = run(&[
            punch("09:00", Direction::In),
            punch("09:05", Direction::In),
            punch("11:00", Direction::Break),
            punch("11:10", Direction::Out),
            punch("11:20", Direction::In),
            punch("17:00", Direction::Out),
            punch("17:05", Direction::Out),
        ]);
        let intervals = result.attendance.intervals();
        for pair in intervals.windows(2) {
            assert!(pair[0].check_out() <= pair[1].check_in());
        }
    }

    #[test]
    fn existing_leave_status_passes_through() {
        let sick = reconcile(day(), &code(), &Vec::<PunchRecord>::new(), &ReconcileConfig::default())
            .with_status(AttendanceStatus::Sick);
        let refreshed = reconcile_existing(
            &sick,
            &[punch("09:00", Direction::In), punch("12:00", Direction::Out)],
            &ReconcileConfig::default(),
        );
        assert_eq!(refreshed.status(), AttendanceStatus::Sick);
        assert_eq!(refreshed.intervals().len(), 1);
    }

    #[test]
    fn existing_derived_status_is_recomputed() {
        let absent = reconcile(day(), &code(), &Vec::<PunchRecord>::new(), &ReconcileConfig::default());
        let refreshed = reconcile_existing(
            &absent,
            &[punch("09:30", Direction::In), punch("17:00", Direction::Out)],
            &ReconcileConfig::default(),
        );
        assert_eq!(refreshed.status(), AttendanceStatus::Late);
    }
}
