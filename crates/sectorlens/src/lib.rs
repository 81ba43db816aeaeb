#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/sectorlens/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod app;
pub mod dashboard;
pub mod error;
pub mod settings;
pub mod store;

// Re-export main types from sub-crates
pub use sectorlens_data as data;
pub use sectorlens_output as output;
pub use sectorlens_pipeline as pipeline;

pub use app::{ExportRequest, SectorLens};
pub use dashboard::{
    CompanyView, DashboardRequest, DashboardView, Notice, SectorView, SeriesView, TickerSeries,
};
pub use error::{ConfigError, Error, Result};
pub use settings::{Settings, load_dotenv};
pub use store::{default_store_path, open_store};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
