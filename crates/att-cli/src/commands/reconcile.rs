//! Reconcile command: rebuild one employee's day from its raw punches.

use std::io::Write;

use anyhow::{Context, Result, anyhow};
use att_core::{AttendanceDto, DateRange, RefreshAttendance};
use att_db::Database;
use chrono::NaiveDate;
use clap::Args;

use super::util::{employee_code, write_day};
use crate::Config;

#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// Employee code.
    #[arg(short, long)]
    pub employee: String,

    /// Day to reconcile (YYYY-MM-DD).
    #[arg(short, long)]
    pub date: NaiveDate,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    config: &Config,
    args: &ReconcileArgs,
) -> Result<()> {
    let code = employee_code(&args.employee)?;
    let reconcile_config = config
        .reconcile_config()
        .context("invalid late_threshold in configuration")?;

    let outcome = RefreshAttendance::new(db, reconcile_config)
        .execute(&code, DateRange::single(args.date))
        .context("failed to reconcile attendance")?;
    let attendance = outcome
        .attendances
        .first()
        .ok_or_else(|| anyhow!("no attendance produced for {code} on {}", args.date))?;
    let dto = AttendanceDto::from_attendance(attendance, &config.validator());

    if args.json {
        serde_json::to_writer_pretty(&mut *writer, &dto)?;
        writeln!(writer)?;
    } else {
        write_day(writer, &dto)?;
    }
    Ok(())
}
