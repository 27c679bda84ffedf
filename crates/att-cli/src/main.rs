use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use att_cli::commands::{employee, import, reconcile, refresh, report, status, validate};
use att_cli::{Cli, Commands, Config};
use att_db::Database;

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?
        .with_validator(config.validator());
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // try_init: tests may have installed a subscriber already
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let mut stdout = io::stdout().lock();

    match &cli.command {
        Some(Commands::Import(args)) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            import::run(&mut stdout, &mut db, args)?;
        }
        Some(Commands::Reconcile(args)) => {
            let (mut db, config) = open_database(cli.config.as_deref())?;
            reconcile::run(&mut stdout, &mut db, &config, args)?;
        }
        Some(Commands::Refresh(args)) => {
            let (mut db, config) = open_database(cli.config.as_deref())?;
            refresh::run(&mut stdout, &mut db, &config, args)?;
        }
        Some(Commands::Report(args)) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            report::run(&mut stdout, &db, &config, args)?;
        }
        Some(Commands::Validate(args)) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let report = validate::run(&mut stdout, &db, &config, args)?;
            if !report.is_valid() {
                bail!("validation failed for {} on {}", args.employee, args.date);
            }
        }
        Some(Commands::Status) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            status::run(&mut stdout, &db, &config.database_path)?;
        }
        Some(Commands::Employee { action }) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            employee::run(&mut stdout, &mut db, action)?;
        }
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            writeln!(stdout)?;
        }
    }

    Ok(())
}
