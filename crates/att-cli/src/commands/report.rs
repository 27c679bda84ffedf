//! Report command: stored attendance for a range plus summary figures.

use std::io::Write;

use anyhow::{Context, Result};
use att_core::{AttendanceReport, GetAttendance};
use att_db::Database;
use chrono::{Local, NaiveDate};
use clap::Args;

use super::util::{RangeArgs, employee_code, is_authorized};
use crate::Config;

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Employee code.
    #[arg(short, long)]
    pub employee: String,

    #[command(flatten)]
    pub range: RangeArgs,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,

    /// View as this employee; access is limited to their own records unless
    /// they are an admin or manager.
    #[arg(long = "as", value_name = "CODE")]
    pub viewer: Option<String>,
}

pub fn run<W: Write>(writer: &mut W, db: &Database, config: &Config, args: &ReportArgs) -> Result<()> {
    run_at(writer, db, config, args, Local::now().date_naive())
}

/// Runs against a fixed `today` so ranges resolve deterministically.
pub fn run_at<W: Write>(
    writer: &mut W,
    db: &Database,
    config: &Config,
    args: &ReportArgs,
    today: NaiveDate,
) -> Result<()> {
    let code = employee_code(&args.employee)?;
    let viewer = args.viewer.as_deref().map(employee_code).transpose()?;
    let range = args.range.resolve(today)?;
    let authorized = is_authorized(db, viewer.as_ref(), &code)?;

    let calculator = config
        .calculator()
        .context("invalid late_threshold in configuration")?;
    let report = GetAttendance::new(db, config.validator(), calculator)
        .execute(&code, range, authorized)
        .context("failed to load attendance")?;

    if args.json {
        serde_json::to_writer_pretty(&mut *writer, &report)?;
        writeln!(writer)?;
        return Ok(());
    }

    writeln!(writer, "Attendance for {code} ({range})")?;
    if report.days.is_empty() {
        writeln!(writer, "No attendance stored. Run `att refresh` first.")?;
        return Ok(());
    }
    write_table(writer, &report)?;
    writeln!(writer)?;
    write_summary(writer, &report)
}

fn write_row<W: Write>(writer: &mut W, columns: [&str; 7]) -> Result<()> {
    let [date, status, check_in, check_out, hours, confidence, review] = columns;
    writeln!(
        writer,
        "{date:<10}  {status:<8}  {check_in:<5}  {check_out:<5}  {hours:<5}  {confidence:<6}  {review}"
    )?;
    Ok(())
}

fn write_table<W: Write>(writer: &mut W, report: &AttendanceReport) -> Result<()> {
    write_row(
        writer,
        ["DATE", "STATUS", "IN", "OUT", "HOURS", "CONF", "REVIEW"],
    )?;
    for day in &report.days {
        let date = day.date.to_string();
        write_row(
            writer,
            [
                &date,
                day.status.as_str(),
                day.check_in.as_deref().unwrap_or("-"),
                day.check_out.as_deref().unwrap_or("-"),
                &day.total_hours,
                day.confidence.as_str(),
                if day.needs_review { "yes" } else { "no" },
            ],
        )?;
    }
    Ok(())
}

fn write_summary<W: Write>(writer: &mut W, report: &AttendanceReport) -> Result<()> {
    let s = &report.summary;
    writeln!(
        writer,
        "Days:          {} (present {}, absent {}, late {}, sick {}, vacation {}, ambiguous {})",
        s.total_days,
        s.present_days,
        s.absent_days,
        s.late_days,
        s.sick_days,
        s.vacation_days,
        s.ambiguous_days
    )?;
    writeln!(
        writer,
        "Hours:         {} total, {} average, {} break",
        s.total_hours, s.average_hours, s.total_break_hours
    )?;
    writeln!(writer, "Attendance:    {}%", s.attendance_rate)?;
    writeln!(
        writer,
        "Avg check-in:  {}",
        s.average_check_in.as_deref().unwrap_or("-")
    )?;
    writeln!(
        writer,
        "Avg check-out: {}",
        s.average_check_out.as_deref().unwrap_or("-")
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use att_core::{
        DateRange, Direction, Employee, EmployeeCode, PunchRecord, ReconcileConfig,
        RefreshAttendance, UseCaseError,
    };
    use att_db::StoredPunch;
    use insta::assert_snapshot;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, d).unwrap()
    }

    fn seeded() -> Database {
        let mut db = Database::open_in_memory().unwrap();
        let code = EmployeeCode::new("EMP001").unwrap();
        let punch = |d: u32, time: &str, direction| {
            StoredPunch::new(
                code.clone(),
                date(d),
                PunchRecord::observed(format!("2025-10-{d:02}T{time}:00"), direction, "GATE-1"),
            )
        };
        db.insert_punches(&[
            punch(13, "08:50", Direction::In),
            punch(13, "17:00", Direction::Out),
            punch(14, "08:30", Direction::In),
            punch(14, "16:30", Direction::Out),
            punch(15, "09:15", Direction::In),
            punch(15, "17:15", Direction::Out),
        ])
        .unwrap();
        RefreshAttendance::new(&mut db, ReconcileConfig::default())
            .execute(&code, DateRange::new(date(13), date(15)).unwrap())
            .unwrap();
        db
    }

    fn args() -> ReportArgs {
        ReportArgs {
            employee: "EMP001".to_string(),
            range: RangeArgs {
                from: Some(date(13)),
                to: Some(date(15)),
                ..RangeArgs::default()
            },
            json: false,
            viewer: None,
        }
    }

    #[test]
    fn report_prints_table_and_summary() {
        let db = seeded();
        let mut output = Vec::new();
        run_at(&mut output, &db, &Config::default(), &args(), date(18)).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        Attendance for EMP001 (2025-10-13..=2025-10-15)
        DATE        STATUS    IN     OUT    HOURS  CONF    REVIEW
        2025-10-13  present   08:50  17:00  08:10  high    no
        2025-10-14  present   08:30  16:30  08:00  high    no
        2025-10-15  late      09:15  17:15  08:00  high    no

        Days:          3 (present 3, absent 0, late 1, sick 0, vacation 0, ambiguous 0)
        Hours:         24:10 total, 08:03 average, 00:00 break
        Attendance:    100%
        Avg check-in:  08:51
        Avg check-out: 16:55
        ");
    }

    #[test]
    fn report_json_contains_days_and_summary() {
        let db = seeded();
        let mut output = Vec::new();
        let args = ReportArgs {
            json: true,
            ..args()
        };
        run_at(&mut output, &db, &Config::default(), &args, date(18)).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(value["employee_code"], "EMP001");
        assert_eq!(value["days"].as_array().unwrap().len(), 3);
        assert_eq!(value["summary"]["late_days"], 1);
        assert_eq!(value["summary"]["total_hours"], "24:10");
    }

    #[test]
    fn empty_range_suggests_refresh() {
        let db = Database::open_in_memory().unwrap();
        let mut output = Vec::new();
        run_at(&mut output, &db, &Config::default(), &args(), date(18)).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        Attendance for EMP001 (2025-10-13..=2025-10-15)
        No attendance stored. Run `att refresh` first.
        ");
    }

    #[test]
    fn peers_cannot_view_each_other() {
        let mut db = seeded();
        let peer = EmployeeCode::new("EMP002").unwrap();
        db.upsert_employee(&Employee::new(peer, "Pia Peer", "pia@example.com", "employee"))
            .unwrap();

        let args = ReportArgs {
            viewer: Some("EMP002".to_string()),
            ..args()
        };
        let mut output = Vec::new();
        let err = run_at(&mut output, &db, &Config::default(), &args, date(18)).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<UseCaseError>(),
            Some(UseCaseError::Unauthorized { .. })
        ));
        assert!(output.is_empty());
    }
}
