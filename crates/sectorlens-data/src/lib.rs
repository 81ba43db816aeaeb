#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/sectorlens/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod ingest;
pub mod model;
pub mod warehouse;

pub use error::{DataError, Result};
pub use ingest::{FactFiles, IngestSummary, ingest, replace_facts};
pub use model::{Company, PositionRecord, PriceRecord, parse_date};
pub use warehouse::{StoreStats, Warehouse};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
