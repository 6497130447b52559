use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::constants::{
    CONFIG_FILE_NAME, DEFAULT_MAX_EMPTY_PERIODS, DEFAULT_MAX_INSTANCES, DEFAULT_PRODID,
};
use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub expansion: ExpansionConfig,
    pub calendar: CalendarConfig,
    pub logging: LoggingConfig,
}

/// Bounds applied while materializing occurrences.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ExpansionConfig {
    /// Maximum occurrences returned for one window.
    pub max_instances: usize,
    /// Consecutive empty periods tolerated before a sequence is treated as exhausted.
    pub max_empty_periods: usize,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            max_instances: DEFAULT_MAX_INSTANCES as usize,
            max_empty_periods: DEFAULT_MAX_EMPTY_PERIODS as usize,
        }
    }
}

impl ExpansionConfig {
    /// ## Errors
    /// Returns `CoreError::ZeroLimit` if either bound is zero.
    pub const fn validate(&self) -> CoreResult<()> {
        if self.max_instances == 0 {
            return Err(CoreError::ZeroLimit("expansion.max_instances"));
        }
        if self.max_empty_periods == 0 {
            return Err(CoreError::ZeroLimit("expansion.max_empty_periods"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarConfig {
    pub prodid: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Settings {
    /// ## Summary
    /// Loads configuration from defaults, environment variables and an optional
    /// `config.toml`. Environment variables use the `RECURRENT_` prefix and `__`
    /// as the section separator (e.g. `RECURRENT_EXPANSION__MAX_INSTANCES`).
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Self::load_from(CONFIG_FILE_NAME)
    }

    /// ## Summary
    /// Same as [`Settings::load`] but reads the TOML file at `path`.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it
    /// fails, or if the loaded values are unusable.
    pub fn load_from(path: &str) -> Result<Self> {
        let settings = Config::builder()
            .set_default("expansion.max_instances", i64::from(DEFAULT_MAX_INSTANCES))?
            .set_default(
                "expansion.max_empty_periods",
                i64::from(DEFAULT_MAX_EMPTY_PERIODS),
            )?
            .set_default("calendar.prodid", DEFAULT_PRODID)?
            .set_default("logging.level", "info")?
            // TOML file
            .add_source(config::File::with_name(path).required(false))
            // Env vars
            .add_source(
                config::Environment::with_prefix("RECURRENT")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;
        settings.validate()?;
        Ok(settings)
    }

    /// ## Errors
    /// Returns a `CoreError` describing the first unusable value.
    pub fn validate(&self) -> CoreResult<()> {
        self.expansion.validate()?;
        if self.calendar.prodid.trim().is_empty() {
            return Err(CoreError::ConfigError("calendar.prodid is empty".to_owned()));
        }
        Ok(())
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    if let Err(e) = dotenvy::dotenv() {
        tracing::trace!(error = %e, "No .env file loaded");
    }

    Settings::load()
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
