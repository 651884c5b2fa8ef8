use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub schedule: ScheduleConfig,
    pub logging: LoggingConfig,
}

/// The per-unit admissibility sections of the schedule.
///
/// Each unit defaults to admitting every value in its domain, so a config
/// only needs to name the units it constrains.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleConfig {
    /// IANA timezone name. Absent means the host's local timezone.
    pub timezone: Option<String>,
    #[serde(default)]
    pub seconds: FieldSpec,
    #[serde(default)]
    pub minutes: FieldSpec,
    #[serde(default)]
    pub hours: FieldSpec,
    #[serde(default)]
    pub days: FieldSpec,
    #[serde(default)]
    pub months: FieldSpec,
    #[serde(default)]
    pub weekdays: FieldSpec,
}

/// Admissible values for one calendar unit.
///
/// Deserializes from `"all"`, `{ list = [..] }`, or
/// `{ range = { start, end, step } }`. This is structured data, not a cron
/// expression grammar.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FieldSpec {
    Keyword(SpecKeyword),
    List { list: Vec<u32> },
    Range { range: RangeSpec },
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecKeyword {
    All,
}

/// Half-open range `[start, end)` admitting every `step`-th value.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RangeSpec {
    pub start: u32,
    pub end: u32,
    #[serde(default = "default_step")]
    pub step: u32,
}

const fn default_step() -> u32 {
    1
}

impl Default for FieldSpec {
    fn default() -> Self {
        Self::Keyword(SpecKeyword::All)
    }
}

impl FieldSpec {
    /// ## Summary
    /// Checks that the spec can admit at least one value.
    ///
    /// ## Errors
    /// Returns an error for an empty list, an empty range, or a zero step.
    pub fn validate(&self, unit: &str) -> CoreResult<()> {
        match self {
            Self::Keyword(SpecKeyword::All) => Ok(()),
            Self::List { list } => {
                if list.is_empty() {
                    return Err(CoreError::ConfigError(format!(
                        "schedule.{unit}: list admits no values"
                    )));
                }
                Ok(())
            }
            Self::Range { range } => {
                if range.step == 0 {
                    return Err(CoreError::ConfigError(format!(
                        "schedule.{unit}: range step must be at least 1"
                    )));
                }
                if range.end <= range.start {
                    return Err(CoreError::ConfigError(format!(
                        "schedule.{unit}: range [{}, {}) is empty",
                        range.start, range.end
                    )));
                }
                Ok(())
            }
        }
    }
}

impl ScheduleConfig {
    /// ## Summary
    /// Validates every per-unit spec, naming the offending unit on failure.
    ///
    /// ## Errors
    /// Returns the first per-unit validation error.
    pub fn validate(&self) -> CoreResult<()> {
        for (unit, spec) in [
            ("seconds", &self.seconds),
            ("minutes", &self.minutes),
            ("hours", &self.hours),
            ("days", &self.days),
            ("months", &self.months),
            ("weekdays", &self.weekdays),
        ] {
            spec.validate(unit)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Settings {
    /// ## Summary
    /// Loads configuration from `.env` file and environment variables into a `Settings`.
    /// Environment variables take precedence over `.env` file values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Ok(Config::builder()
            .set_default("logging.level", "debug")?
            // Env file
            .add_source(
                config::Environment::default()
                    .convert_case(config::Case::Snake)
                    .separator("_")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            .build()?
            .try_deserialize::<Settings>()?)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}
