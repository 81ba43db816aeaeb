//! Error types for the SectorLens facade.

use sectorlens_data::DataError;
use sectorlens_output::ExportError;
use thiserror::Error;

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration source could not be read or deserialized.
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// The `.env` file exists but could not be parsed.
    #[error("Failed to read .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),

    /// A setting holds a value outside its allowed range.
    #[error("Invalid setting {key}: {reason}")]
    Invalid {
        /// Setting name.
        key: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Any failure surfaced by [`crate::SectorLens`].
#[derive(Debug, Error)]
pub enum Error {
    /// Settings could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Fact store failure.
    #[error(transparent)]
    Data(#[from] DataError),

    /// Export or summary failure.
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Result type for facade operations.
pub type Result<T> = std::result::Result<T, Error>;
