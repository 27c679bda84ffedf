//! CLI subcommand implementations.

pub mod employee;
pub mod import;
pub mod reconcile;
pub mod refresh;
pub mod report;
pub mod status;
pub mod util;
pub mod validate;
