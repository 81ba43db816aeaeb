//! Layered application settings.
//!
//! Values come from built-in defaults, then an optional TOML file, then
//! `SECTORLENS_*` environment variables. Later layers win.

use crate::error::ConfigError;
use crate::store::default_store_path;
use chrono::NaiveDate;
use config::{Environment, File};
use sectorlens_pipeline::PipelineConfig;
use sectorlens_pipeline::pipeline::DEFAULT_CACHE_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Base name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "sectorlens";

/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "SECTORLENS";

/// Default length of the sector rollup date range, in days.
pub const DEFAULT_RANGE_DAYS: u32 = 30;

/// Application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// SQLite fact store location.
    pub database_path: PathBuf,

    /// Days before the latest position date covered by the default range.
    pub default_range_days: u32,

    /// Maximum number of memoized sector rollups.
    pub cache_capacity: usize,

    /// Processing date for the trailing-year window; today when unset.
    pub as_of: Option<NaiveDate>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: default_store_path(),
            default_range_days: DEFAULT_RANGE_DAYS,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            as_of: None,
        }
    }
}

impl Settings {
    /// Load settings from `path` (or `sectorlens.toml` when present) and the
    /// environment.
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, Environment::with_prefix(ENV_PREFIX))
    }

    /// Load settings with a caller-supplied environment layer.
    pub fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings: Self = config::Config::builder()
            .add_source(file)
            .add_source(env.try_parsing(true))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        debug!(
            database = %settings.database_path.display(),
            cache_capacity = settings.cache_capacity,
            "settings loaded"
        );
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_capacity == 0 {
            return Err(ConfigError::Invalid {
                key: "cache_capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                key: "database_path",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Pipeline settings derived from these settings.
    pub const fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            cache_capacity: self.cache_capacity,
            as_of: self.as_of,
        }
    }
}

/// Load a `.env` file from the working directory or its parents, if any.
///
/// A missing file is not an error.
pub fn load_dotenv() -> Result<(), ConfigError> {
    match dotenvy::dotenv() {
        Ok(path) => {
            debug!(path = %path.display(), "loaded .env");
            Ok(())
        }
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}
