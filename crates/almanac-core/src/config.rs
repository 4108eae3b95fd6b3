use anyhow::Result;
use config::{Config, ConfigBuilder, FileFormat, builder::DefaultState};
use serde::Deserialize;

use crate::constants::{DEFAULT_FOREVER_HORIZON_YEARS, DEFAULT_MAX_OCCURRENCES, ENV_PREFIX};
use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub recurrence: RecurrenceConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecurrenceConfig {
    /// Years past the anchor used to bound FOREVER series.
    pub forever_horizon_years: u32,
    /// Requests estimated to produce more slots than this are rejected.
    pub max_occurrences: u64,
}

impl Default for RecurrenceConfig {
    fn default() -> Self {
        Self {
            forever_horizon_years: DEFAULT_FOREVER_HORIZON_YEARS,
            max_occurrences: DEFAULT_MAX_OCCURRENCES,
        }
    }
}

impl RecurrenceConfig {
    /// ## Summary
    /// Checks that the limits can bound a series at all.
    ///
    /// ## Errors
    /// Returns `CoreError::ConfigError` if either limit is zero.
    pub fn validate(&self) -> CoreResult<()> {
        if self.forever_horizon_years == 0 {
            return Err(CoreError::ConfigError(
                "recurrence.forever_horizon_years must be at least 1".to_string(),
            ));
        }
        if self.max_occurrences == 0 {
            return Err(CoreError::ConfigError(
                "recurrence.max_occurrences must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

fn with_defaults() -> Result<ConfigBuilder<DefaultState>> {
    Ok(Config::builder()
        .set_default(
            "recurrence.forever_horizon_years",
            DEFAULT_FOREVER_HORIZON_YEARS,
        )?
        .set_default("recurrence.max_occurrences", DEFAULT_MAX_OCCURRENCES)?
        .set_default("logging.level", "info")?)
}

impl Settings {
    /// ## Summary
    /// Loads configuration from environment variables and an optional `config.toml`.
    /// Environment variables are read as `ALMANAC_<SECTION>__<KEY>`, e.g.
    /// `ALMANAC_RECURRENCE__MAX_OCCURRENCES`.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Ok(with_defaults()?
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .add_source(config::File::with_name("config.toml").required(false))
            .build()?
            .try_deserialize::<Settings>()?)
    }

    /// ## Summary
    /// Builds settings from an in-memory TOML document layered over the defaults.
    ///
    /// ## Errors
    /// Returns an error if the document is not valid TOML or does not deserialize.
    pub fn from_toml(source: &str) -> Result<Self> {
        Ok(with_defaults()?
            .add_source(config::File::from_str(source, FileFormat::Toml))
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
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!(error = %e, "No .env file loaded");
    }

    Settings::load()
}
