//! Employee directory commands.

use std::io::Write;

use anyhow::{Context, Result};
use att_core::Employee;
use att_db::Database;
use chrono::NaiveDate;
use clap::Subcommand;

use super::util::employee_code;

/// Employee management actions.
#[derive(Debug, Subcommand)]
pub enum EmployeeAction {
    /// Add an employee, replacing any existing record with the same code.
    Add {
        /// Employee code.
        #[arg(long)]
        code: String,

        /// Full name.
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        /// `employee`, `operator`, `manager` or `admin`.
        #[arg(long, default_value = "employee")]
        role: String,

        #[arg(long)]
        department: Option<String>,

        #[arg(long)]
        designation: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        /// Join date (YYYY-MM-DD).
        #[arg(long)]
        join_date: Option<NaiveDate>,

        #[arg(long)]
        location: Option<String>,
    },

    /// List all employees.
    List,
}

pub fn run<W: Write>(writer: &mut W, db: &mut Database, action: &EmployeeAction) -> Result<()> {
    match action {
        EmployeeAction::Add {
            code,
            name,
            email,
            role,
            department,
            designation,
            phone,
            join_date,
            location,
        } => {
            let employee = Employee {
                department: department.clone(),
                designation: designation.clone(),
                phone: phone.clone(),
                join_date: *join_date,
                location: location.clone(),
                ..Employee::new(employee_code(code)?, name, email, role)
            };
            db.upsert_employee(&employee)
                .context("failed to save employee")?;
            writeln!(writer, "Saved {}", employee.full_display_name())?;
        }
        EmployeeAction::List => {
            let employees = db.list_employees().context("failed to list employees")?;
            if employees.is_empty() {
                writeln!(writer, "No employees.")?;
                return Ok(());
            }
            for employee in employees {
                let department = employee
                    .department
                    .as_deref()
                    .map(|d| format!(", {d}"))
                    .unwrap_or_default();
                writeln!(
                    writer,
                    "{:<3} {} [{}{department}]",
                    employee.initials(),
                    employee.full_display_name(),
                    employee.role
                )?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    fn add(code: &str, name: &str, role: &str, department: Option<&str>) -> EmployeeAction {
        EmployeeAction::Add {
            code: code.to_string(),
            name: name.to_string(),
            email: format!("{}@example.com", code.to_lowercase()),
            role: role.to_string(),
            department: department.map(str::to_string),
            designation: None,
            phone: None,
            join_date: None,
            location: None,
        }
    }

    #[test]
    fn add_then_list() {
        let mut db = Database::open_in_memory().unwrap();
        let mut output = Vec::new();
        run(&mut output, &mut db, &add("EMP002", "Bo Li", "employee", None)).unwrap();
        run(
            &mut output,
            &mut db,
            &add("EMP001", "Ada Mae King", "manager", Some("Ops")),
        )
        .unwrap();
        run(&mut output, &mut db, &EmployeeAction::List).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        Saved Bo Li (EMP002)
        Saved Ada Mae King (EMP001)
        AMK Ada Mae King (EMP001) [manager, Ops]
        BL  Bo Li (EMP002) [employee]
        ");
    }

    #[test]
    fn invalid_code_is_rejected() {
        let mut db = Database::open_in_memory().unwrap();
        let mut output = Vec::new();
        assert!(run(&mut output, &mut db, &add("  ", "Nobody", "employee", None)).is_err());
        assert!(output.is_empty());
    }
}
