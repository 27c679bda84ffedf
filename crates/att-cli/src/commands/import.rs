//! Import command for loading raw punches into the local `SQLite` store.
//!
//! Input is JSON Lines, one punch per line. Lines that cannot be stored (bad
//! JSON, bad employee code, no way to tell which day they belong to) are
//! reported and skipped; everything else is stored verbatim, even when the
//! time or direction is malformed, so reconciliation can flag it.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use att_core::timefmt::parse_timestamp;
use att_core::{EmployeeCode, PunchRecord};
use att_db::{Database, StoredPunch};
use chrono::NaiveDate;
use clap::Args;
use serde::Deserialize;

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// JSON Lines file to read, or `-` for stdin.
    pub file: PathBuf,
}

/// Counts from an import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub read: usize,
    pub inserted: usize,
    pub skipped: usize,
}

pub fn run<W: Write>(writer: &mut W, db: &mut Database, args: &ImportArgs) -> Result<ImportSummary> {
    if args.file.as_os_str() == "-" {
        let stdin = io::stdin();
        import_from(writer, db, stdin.lock())
    } else {
        let file = File::open(&args.file)
            .with_context(|| format!("failed to open {}", args.file.display()))?;
        import_from(writer, db, BufReader::new(file))
    }
}

/// Parses and stores punches from `reader`, reporting skipped lines to `writer`.
pub fn import_from<W: Write, R: BufRead>(
    writer: &mut W,
    db: &mut Database,
    reader: R,
) -> Result<ImportSummary> {
    let mut punches = Vec::new();
    let mut summary = ImportSummary::default();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", idx + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        summary.read += 1;
        match parse_line(trimmed) {
            Ok(punch) => punches.push(punch),
            Err(err) => {
                summary.skipped += 1;
                tracing::warn!(line = idx + 1, error = %err, "skipping punch");
                writeln!(writer, "skipped line {}: {err:#}", idx + 1)?;
            }
        }
    }

    summary.inserted = db
        .insert_punches(&punches)
        .context("failed to store punches")?;
    let duplicates = punches.len() - summary.inserted;

    writeln!(
        writer,
        "Imported {} punch(es) ({} duplicate, {} skipped)",
        summary.inserted, duplicates, summary.skipped
    )?;
    Ok(summary)
}

#[derive(Debug, Deserialize)]
struct ImportPunch {
    #[serde(default)]
    id: Option<String>,
    employee_code: String,
    /// Overrides the day derived from `time`.
    #[serde(default)]
    date: Option<NaiveDate>,
    #[serde(flatten)]
    record: PunchRecord,
}

fn parse_line(line: &str) -> Result<StoredPunch> {
    let parsed: ImportPunch = serde_json::from_str(line).context("invalid JSON")?;
    let code = EmployeeCode::new(&parsed.employee_code).context("invalid employee code")?;
    let day = match parsed.date {
        Some(day) => day,
        None => parse_timestamp(&parsed.record.time, None)
            .map(|time| time.date())
            .map_err(|_| anyhow!("cannot tell the day of time {:?}", parsed.record.time))?,
    };
    Ok(match parsed.id.filter(|id| !id.trim().is_empty()) {
        Some(id) => StoredPunch::with_id(id, code, day, parsed.record),
        None => StoredPunch::new(code, day, parsed.record),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use att_core::{DateRange, PunchSource};
    use insta::assert_snapshot;
    use std::io::Cursor;

    #[test]
    fn imports_valid_lines_and_reports_bad_ones() {
        let mut db = Database::open_in_memory().unwrap();
        let input = r#"{"id":"p1","employee_code":"EMP001","time":"2025-10-18T09:00:00","direction":"in","device_id":"D1"}
{"id":"p2","employee_code":"EMP001","time":"2025-10-18T17:00:00","direction":"out","device_id":"D1","confidence":"medium"}
not json
{"employee_code":"","time":"2025-10-18T17:00:00","direction":"out"}
{"employee_code":"EMP001","time":"5pm","direction":"out"}

{"id":"p1","employee_code":"EMP001","time":"2025-10-18T09:00:00","direction":"in","device_id":"D1"}
"#;
        let mut output = Vec::new();
        let summary = import_from(&mut output, &mut db, Cursor::new(input)).unwrap();

        assert_eq!(
            summary,
            ImportSummary {
                read: 6,
                inserted: 2,
                skipped: 3
            }
        );
        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r#"
        skipped line 3: invalid JSON: expected ident at line 1 column 2
        skipped line 4: invalid employee code: employee code cannot be empty
        skipped line 5: cannot tell the day of time "5pm"
        Imported 2 punch(es) (1 duplicate, 3 skipped)
        "#);
    }

    #[test]
    fn explicit_date_keeps_malformed_time() {
        let mut db = Database::open_in_memory().unwrap();
        let input = r#"{"employee_code":"EMP001","date":"2025-10-18","time":"25:99","direction":"in"}"#;
        let mut output = Vec::new();
        import_from(&mut output, &mut db, Cursor::new(input)).unwrap();

        let code = EmployeeCode::new("EMP001").unwrap();
        let day = NaiveDate::from_ymd_opt(2025, 10, 18).unwrap();
        let punches = db.punches_for_day(&code, day).unwrap();
        assert_eq!(punches.len(), 1);
        assert_eq!(punches[0].time, "25:99");
        assert_eq!(punches[0].confidence, "high");
        assert_eq!(db.punch_count(&code, DateRange::single(day)).unwrap(), 1);
    }
}
