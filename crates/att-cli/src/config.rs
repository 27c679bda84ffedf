//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use att_core::timefmt::parse_time_of_day;
use att_core::{
    AttendanceCalculator, AttendanceValidator, ReconcileConfig, ValidationError,
    validator::DEFAULT_EXCESSIVE_HOURS,
};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// Check-ins after this `HH:MM` time of day are late.
    pub late_threshold: String,

    /// Worked hours above this flag a day for review.
    pub excessive_hours: f64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("late_threshold", &self.late_threshold)
            .field("excessive_hours", &self.excessive_hours)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("att.db"),
            late_threshold: "09:00".to_string(),
            excessive_hours: DEFAULT_EXCESSIVE_HOURS,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    ///
    /// Later sources win: defaults, the user config file, `config_path`, then
    /// `ATT_*` environment variables.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("ATT_"));

        figment.extract()
    }

    pub fn reconcile_config(&self) -> Result<ReconcileConfig, ValidationError> {
        Ok(ReconcileConfig {
            late_threshold: parse_time_of_day(&self.late_threshold)?,
        })
    }

    pub fn calculator(&self) -> Result<AttendanceCalculator, ValidationError> {
        Ok(AttendanceCalculator::new(parse_time_of_day(
            &self.late_threshold,
        )?))
    }

    pub const fn validator(&self) -> AttendanceValidator {
        AttendanceValidator::new(self.excessive_hours)
    }
}

/// Returns the platform-specific config directory for att.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("att"))
}

/// Returns the platform-specific data directory for att.
///
/// On Linux: `~/.local/share/att`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("att"))
}
