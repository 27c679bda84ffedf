//! Status command for showing what the store holds per employee.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use att_db::Database;

pub fn run<W: Write>(writer: &mut W, db: &Database, database_path: &Path) -> Result<()> {
    let counts = db
        .counts_by_employee()
        .context("failed to count stored records")?;

    writeln!(writer, "Attendance status")?;
    writeln!(writer, "Database: {}", database_path.display())?;

    if counts.is_empty() {
        writeln!(writer, "No punches recorded.")?;
        return Ok(());
    }

    writeln!(writer, "Employees:")?;
    for entry in counts {
        let name = entry
            .name
            .map(|name| format!(" ({name})"))
            .unwrap_or_default();
        writeln!(
            writer,
            "- {}{name}: {} punch(es), {} day(s), {} need review",
            entry.employee_code, entry.punches, entry.attendance_days, entry.needs_review
        )?;
    }

    Ok(())
}
