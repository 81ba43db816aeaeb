#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/sectorlens/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod filter;
pub mod frame;
pub mod summary;
pub mod table;

pub use export::{ExportDataset, ExportError, ExportFormat, Exporter, TableRow};
pub use filter::CompanyFilter;
pub use frame::ToDataFrame;
pub use summary::{CompanyKpis, PriceStats, company_kpis};
pub use table::AsciiTable;
