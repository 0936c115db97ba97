//! TOML settings for `finance-report`.
//!
//! ```toml
//! [database]
//! backend = "sqlite"
//! connection_string = "finance.db"
//!
//! [aggregator]
//! strict_mode = true
//! trend_window = 4
//!
//! [report]
//! year = 2024
//! schedule = "standard"
//! income = 25000
//! ```
//!
//! Every table and key is optional. Command-line flags win over the file.

use std::fs;
use std::path::{Path, PathBuf};

use finance_core::AggregatorConfig;
use finance_core::db::DbConfig;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_TAX_SCHEDULE: &str = "standard";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),
}

/// What to report on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Fiscal year; the newest stored year when unset.
    pub year: Option<i32>,
    /// Monthly records CSV read instead of the store.
    pub csv: Option<PathBuf>,
    /// Tax schedule used for the payroll line.
    pub schedule: String,
    /// Payroll figure to run through the tax brackets.
    pub income: Option<Decimal>,
    /// Forecast horizon; the aggregator default when unset.
    pub months: Option<usize>,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            year: None,
            csv: None,
            schedule: DEFAULT_TAX_SCHEDULE.to_string(),
            income: None,
            months: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database: DbConfig,
    pub aggregator: AggregatorConfig,
    pub report: ReportSettings,
}

/// Values given on the command line. `None` keeps the file's value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub backend: Option<String>,
    pub db: Option<String>,
    pub year: Option<i32>,
    pub csv: Option<PathBuf>,
    pub schedule: Option<String>,
    pub income: Option<Decimal>,
    pub months: Option<usize>,
    pub strict: bool,
}

impl Settings {
    pub fn from_toml_str(text: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Settings from `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn apply(
        &mut self,
        overrides: Overrides,
    ) {
        if let Some(backend) = overrides.backend {
            self.database.backend = backend;
        }
        if let Some(db) = overrides.db {
            self.database.connection_string = db;
        }
        if overrides.year.is_some() {
            self.report.year = overrides.year;
        }
        if overrides.csv.is_some() {
            self.report.csv = overrides.csv;
        }
        if let Some(schedule) = overrides.schedule {
            self.report.schedule = schedule;
        }
        if overrides.income.is_some() {
            self.report.income = overrides.income;
        }
        if overrides.months.is_some() {
            self.report.months = overrides.months;
        }
        // A flag can only switch strict mode on.
        if overrides.strict {
            self.aggregator.strict_mode = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.report.schedule, "standard");
        assert_eq!(settings.database.backend, "sqlite");
    }

    #[test]
    fn reads_every_table() {
        let settings = Settings::from_toml_str(
            r#"
            [database]
            backend = "memory"

            [aggregator]
            strict_mode = true
            trend_window = 4

            [aggregator.budget_thresholds]
            warning = 60

            [report]
            year = 2024
            schedule = "contractor"
            income = 25000
            months = 6
            "#,
        )
        .unwrap();

        assert_eq!(settings.database.backend, "memory");
        assert_eq!(settings.database.connection_string, ":memory:");
        assert!(settings.aggregator.strict_mode);
        assert_eq!(settings.aggregator.trend_window, 4);
        assert_eq!(settings.aggregator.forecast_horizon, 3);
        assert_eq!(settings.aggregator.budget_thresholds.warning, dec!(60));
        assert_eq!(settings.aggregator.budget_thresholds.critical, dec!(90));
        assert_eq!(settings.report.year, Some(2024));
        assert_eq!(settings.report.schedule, "contractor");
        assert_eq!(settings.report.income, Some(dec!(25000)));
        assert_eq!(settings.report.months, Some(6));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let result = Settings::from_toml_str("[report]\nyear = \"soon\"");
        assert!(matches!(result, Err(SettingsError::Parse(_))));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let result = Settings::load(Path::new("/definitely/not/here.toml"));
        assert!(matches!(result, Err(SettingsError::Read { .. })));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[report]\nyear = 2023").unwrap();

        let settings = Settings::load_or_default(Some(file.path())).unwrap();
        assert_eq!(settings.report.year, Some(2023));
    }

    #[test]
    fn overrides_win_over_file_values() {
        let mut settings = Settings::from_toml_str(
            "[database]\nconnection_string = \"finance.db\"\n[report]\nyear = 2023\nincome = 1000",
        )
        .unwrap();

        settings.apply(Overrides {
            db: Some(":memory:".to_string()),
            year: Some(2024),
            strict: true,
            ..Default::default()
        });

        assert_eq!(settings.database.connection_string, ":memory:");
        assert_eq!(settings.report.year, Some(2024));
        assert_eq!(settings.report.income, Some(dec!(1000)));
        assert!(settings.aggregator.strict_mode);
    }

    #[test]
    fn absent_strict_flag_keeps_file_setting() {
        let mut settings = Settings::from_toml_str("[aggregator]\nstrict_mode = true").unwrap();
        settings.apply(Overrides::default());
        assert!(settings.aggregator.strict_mode);
    }
}
