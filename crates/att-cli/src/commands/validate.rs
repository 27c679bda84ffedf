//! Validate command: check one day's raw punches and attendance for problems.
//!
//! Raw punches are checked in storage order, so out-of-order device uploads
//! and adjacent duplicates show up. The day itself is checked from the stored
//! record, or from a fresh reconciliation (not saved) when none is stored.

use std::io::Write;

use anyhow::{Context, Result};
use att_core::{AttendanceRepository, PunchLog, PunchSource, ValidationReport, reconcile};
use att_db::Database;
use chrono::NaiveDate;
use clap::Args;

use super::util::employee_code;
use crate::Config;

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Employee code.
    #[arg(short, long)]
    pub employee: String,

    /// Day to check (YYYY-MM-DD).
    #[arg(short, long)]
    pub date: NaiveDate,
}

/// Writes the findings and returns the combined report.
pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    config: &Config,
    args: &ValidateArgs,
) -> Result<ValidationReport> {
    let code = employee_code(&args.employee)?;
    let validator = config.validator();

    let raw = db
        .punches_for_day(&code, args.date)
        .context("failed to read punches")?;
    let stored = db
        .get_by_date(&code, args.date)
        .context("failed to read attendance")?;
    let source = if stored.is_some() {
        "stored attendance"
    } else {
        "fresh reconciliation"
    };
    writeln!(writer, "Validating {code} on {} ({source})", args.date)?;

    let mut punches = Vec::with_capacity(raw.len());
    for (position, punch) in raw.iter().enumerate() {
        match PunchLog::parse(punch, Some(args.date)) {
            Ok(log) => punches.push(log),
            Err(err) => writeln!(writer, "malformed punch {}: {err}", position + 1)?,
        }
    }
    let mut report = validator.validate_punch_sequence(&punches);

    let attendance = match stored {
        Some(attendance) => attendance,
        None => {
            let reconcile_config = config
                .reconcile_config()
                .context("invalid late_threshold in configuration")?;
            reconcile(args.date, &code, &raw, &reconcile_config)
        }
    };
    report.merge(validator.validate(&attendance));

    write!(writer, "{report}")?;
    Ok(report)
}
