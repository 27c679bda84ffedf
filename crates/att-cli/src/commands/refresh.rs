//! Refresh command: reconcile a range of days and store the results.

use std::io::Write;

use anyhow::{Context, Result};
use att_core::RefreshAttendance;
use att_db::Database;
use chrono::{Local, NaiveDate};
use clap::Args;

use super::util::{RangeArgs, employee_code};
use crate::Config;

#[derive(Debug, Args)]
pub struct RefreshArgs {
    /// Employee code.
    #[arg(short, long)]
    pub employee: String,

    #[command(flatten)]
    pub range: RangeArgs,
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    config: &Config,
    args: &RefreshArgs,
) -> Result<()> {
    run_at(writer, db, config, args, Local::now().date_naive())
}

/// Runs against a fixed `today` so ranges resolve deterministically.
pub fn run_at<W: Write>(
    writer: &mut W,
    db: &mut Database,
    config: &Config,
    args: &RefreshArgs,
    today: NaiveDate,
) -> Result<()> {
    let code = employee_code(&args.employee)?;
    let range = args.range.resolve(today)?;
    let reconcile_config = config
        .reconcile_config()
        .context("invalid late_threshold in configuration")?;

    let outcome = RefreshAttendance::new(db, reconcile_config)
        .execute(&code, range)
        .context("failed to refresh attendance")?;

    writeln!(
        writer,
        "Refreshed {} day(s) for {code} ({range}) from {} punch(es)",
        outcome.days, outcome.punches
    )?;
    if outcome.ambiguous_days > 0 {
        writeln!(writer, "Ambiguous days: {}", outcome.ambiguous_days)?;
    }
    if outcome.leave_days_kept > 0 {
        writeln!(writer, "Leave days kept: {}", outcome.leave_days_kept)?;
    }
    Ok(())
}
