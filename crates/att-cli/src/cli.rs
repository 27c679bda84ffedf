//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::employee::EmployeeAction;
use crate::commands::import::ImportArgs;
use crate::commands::reconcile::ReconcileArgs;
use crate::commands::refresh::RefreshArgs;
use crate::commands::report::ReportArgs;
use crate::commands::validate::ValidateArgs;

/// Attendance punch reconciliation.
///
/// Imports raw clock punches from devices and rebuilds trustworthy daily
/// attendance with confidence ratings and review flags.
#[derive(Debug, Parser)]
#[command(name = "att", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Import raw punches from a JSON Lines file (`-` for stdin).
    Import(ImportArgs),

    /// Reconcile and store one employee's day.
    Reconcile(ReconcileArgs),

    /// Reconcile and store a range of days.
    Refresh(RefreshArgs),

    /// Show stored attendance and a summary.
    Report(ReportArgs),

    /// Check a day's punches and attendance for problems.
    Validate(ValidateArgs),

    /// Show database location and per-employee counts.
    Status,

    /// Manage employees.
    Employee {
        #[command(subcommand)]
        action: EmployeeAction,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_report_with_range() {
        let cli = Cli::try_parse_from([
            "att",
            "report",
            "--employee",
            "EMP001",
            "--from",
            "2025-10-01",
            "--to",
            "2025-10-07",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Report(args)) => {
                assert_eq!(args.employee, "EMP001");
                assert!(args.json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn range_flags_conflict() {
        let result = Cli::try_parse_from([
            "att",
            "refresh",
            "--employee",
            "EMP001",
            "--month",
            "--last-days",
            "3",
        ]);
        assert!(result.is_err());
    }
}
