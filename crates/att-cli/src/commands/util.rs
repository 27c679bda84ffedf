//! Helpers shared by subcommands.

use std::io::Write;

use anyhow::{Context, Result};
use att_core::{AttendanceDto, DateRange, EmployeeCode};
use att_db::Database;
use chrono::NaiveDate;
use clap::Args;

/// Days to cover when no range flag is given.
pub const DEFAULT_RANGE_DAYS: u32 = 7;

/// Date range selection shared by `refresh` and `report`.
#[derive(Debug, Clone, Default, Args)]
pub struct RangeArgs {
    /// First day of the range (YYYY-MM-DD).
    #[arg(long, requires = "to")]
    pub from: Option<NaiveDate>,

    /// Last day of the range, inclusive (YYYY-MM-DD).
    #[arg(long, requires = "from")]
    pub to: Option<NaiveDate>,

    /// The last N days up to and including today.
    #[arg(long, conflicts_with_all = ["from", "to", "month"])]
    pub last_days: Option<u32>,

    /// The current calendar month.
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub month: bool,
}

impl RangeArgs {
    /// Resolves the flags against `today`. Defaults to the last 7 days.
    pub fn resolve(&self, today: NaiveDate) -> Result<DateRange> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            return Ok(DateRange::new(from, to)?);
        }
        if self.month {
            return Ok(DateRange::month_of(today));
        }
        Ok(DateRange::last_n_days_from(
            today,
            self.last_days.unwrap_or(DEFAULT_RANGE_DAYS),
        ))
    }
}

pub fn employee_code(raw: &str) -> Result<EmployeeCode> {
    EmployeeCode::new(raw).with_context(|| format!("invalid employee code {raw:?}"))
}

/// Whether `viewer` may see `code`'s attendance.
///
/// No viewer means the local operator, who sees everything. Otherwise
/// employees see their own records and admins or managers see everyone's.
pub fn is_authorized(db: &Database, viewer: Option<&EmployeeCode>, code: &EmployeeCode) -> Result<bool> {
    let Some(viewer) = viewer else {
        return Ok(true);
    };
    if viewer == code {
        return Ok(true);
    }
    let employee = db
        .get_employee(viewer)
        .context("failed to look up viewer")?;
    Ok(employee.is_some_and(|e| e.is_admin() || e.is_manager()))
}

/// Writes one day in the long human-readable layout.
pub fn write_day<W: Write>(writer: &mut W, dto: &AttendanceDto) -> Result<()> {
    writeln!(
        writer,
        "{} {}: {} (confidence {})",
        dto.employee_code, dto.date, dto.status, dto.confidence
    )?;
    writeln!(writer, "Check-in:  {}", dto.check_in.as_deref().unwrap_or("-"))?;
    writeln!(writer, "Check-out: {}", dto.check_out.as_deref().unwrap_or("-"))?;
    writeln!(writer, "Total:     {}", dto.total_hours)?;
    if !dto.intervals.is_empty() {
        writeln!(writer, "Intervals:")?;
        for interval in &dto.intervals {
            writeln!(
                writer,
                "  {}-{} {:<5} {}",
                interval.check_in,
                interval.check_out,
                interval.kind.as_str(),
                interval.duration
            )?;
        }
    }
    writeln!(writer, "Punches:   {}", dto.punch_logs.len())?;
    writeln!(
        writer,
        "Needs review: {}",
        if dto.needs_review { "yes" } else { "no" }
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use att_core::Employee;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn explicit_range_wins() {
        let args = RangeArgs {
            from: Some(date(2025, 10, 1)),
            to: Some(date(2025, 10, 3)),
            ..RangeArgs::default()
        };
        let range = args.resolve(date(2025, 10, 18)).unwrap();
        assert_eq!(range.start(), date(2025, 10, 1));
        assert_eq!(range.end(), date(2025, 10, 3));
    }

    #[test]
    fn inverted_range_is_an_error() {
        let args = RangeArgs {
            from: Some(date(2025, 10, 3)),
            to: Some(date(2025, 10, 1)),
            ..RangeArgs::default()
        };
        assert!(args.resolve(date(2025, 10, 18)).is_err());
    }

    #[test]
    fn month_and_default_ranges() {
        let month = RangeArgs {
            month: true,
            ..RangeArgs::default()
        };
        let range = month.resolve(date(2025, 2, 10)).unwrap();
        assert_eq!(range.end(), date(2025, 2, 28));

        let range = RangeArgs::default().resolve(date(2025, 10, 18)).unwrap();
        assert_eq!(range.start(), date(2025, 10, 12));
        assert_eq!(range.end(), date(2025, 10, 18));
    }

    #[test]
    fn managers_may_view_others() {
        let mut db = Database::open_in_memory().unwrap();
        let manager = employee_code("MGR001").unwrap();
        let worker = employee_code("EMP001").unwrap();
        let peer = employee_code("EMP002").unwrap();
        db.upsert_employee(&Employee::new(manager.clone(), "Max", "max@example.com", "manager"))
            .unwrap();
        db.upsert_employee(&Employee::new(peer.clone(), "Pia", "pia@example.com", "operator"))
            .unwrap();

        assert!(is_authorized(&db, None, &worker).unwrap());
        assert!(is_authorized(&db, Some(&worker), &worker).unwrap());
        assert!(is_authorized(&db, Some(&manager), &worker).unwrap());
        assert!(!is_authorized(&db, Some(&peer), &worker).unwrap());
    }
}
