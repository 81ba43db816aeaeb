//! Fact store location and opening.

use sectorlens_data::{Result, Warehouse};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Get the default data directory.
///
/// Uses platform-specific cache directories:
/// - Linux: `~/.cache/sectorlens/`
/// - macOS: `~/Library/Caches/sectorlens/`
/// - Windows: `%LOCALAPPDATA%\sectorlens\`
pub fn default_data_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sectorlens")
}

/// Get the default fact store path.
pub fn default_store_path() -> PathBuf {
    default_data_dir().join("sectorlens.db")
}

/// Open the fact store at `path`, creating its directory if needed.
pub fn open_store(path: &Path) -> Result<Warehouse> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    debug!(path = %path.display(), "opening fact store");
    Warehouse::new(path)
}
