#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/sectorlens/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod daily;
pub mod lookups;
pub mod memo;
pub mod pipeline;
pub mod quartile;
pub mod range;
pub mod sectors;
pub mod series;

pub use daily::DailyPosition;
pub use memo::{CacheStats, MemoCache};
pub use pipeline::{Pipeline, PipelineConfig};
pub use quartile::{TopCompany, ntile, quartile_sizes};
pub use range::{ALL_SECTORS, DateRange, SectorSelection, SectorSet};
pub use sectorlens_data::{DataError, Result};
pub use sectors::{SectorTotal, TOP_SECTOR_LIMIT};
pub use series::PricePoint;
