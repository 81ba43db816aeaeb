//! Export functionality for SectorLens result tables.
//!
//! Every tabular result can be written as CSV or as compact or pretty JSON.
//! CSV output always starts with a header row, so an empty result still
//! produces a file with the expected columns.

use sectorlens_pipeline::{PricePoint, SectorTotal, TopCompany};
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialized output was not valid UTF-8.
    #[error("Encoding error: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// DataFrame construction or evaluation error.
    #[error("DataFrame error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Date outside the range a polars `Date` column can hold.
    #[error("Date out of range for a DataFrame: {0}")]
    DateOutOfRange(chrono::NaiveDate),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Comma-separated values format.
    #[default]
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" | "prettyjson" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Json => write!(f, "json"),
            Self::PrettyJson => write!(f, "pretty-json"),
        }
    }
}

/// A row type with a fixed column layout.
///
/// `COLUMNS` lists the serialized field names in declaration order.
pub trait TableRow: Serialize {
    /// Column names, in serialization order.
    const COLUMNS: &'static [&'static str];
}

impl TableRow for SectorTotal {
    const COLUMNS: &'static [&'static str] = &["sector_name", "total_position_usd"];
}

impl TableRow for TopCompany {
    const COLUMNS: &'static [&'static str] = &[
        "ticker",
        "sector_name",
        "shares",
        "last_close_price_usd",
        "average_position_usd",
    ];
}

impl TableRow for PricePoint {
    const COLUMNS: &'static [&'static str] = &["date", "close_usd"];
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

impl<T: TableRow> Exporter for [T] {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => to_csv(self),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

impl<T: TableRow> Exporter for Vec<T> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        self.as_slice().export_to_string(format)
    }
}

/// Header row first, then one record per row. Missing values are empty fields.
fn to_csv<T: TableRow>(rows: &[T]) -> Result<String, ExportError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(vec![]);
    wtr.write_record(T::COLUMNS)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// The exportable result tables, named as the dashboard names its downloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportDataset {
    /// Top sectors by total position value.
    TopSectors,

    /// Top-quartile companies.
    TopCompanies,

    /// Price history of one ticker.
    Series(String),
}

impl ExportDataset {
    /// File name without extension.
    pub fn file_stem(&self) -> String {
        match self {
            Self::TopSectors => "Top_10_Sectors".to_string(),
            Self::TopCompanies => "Top 25% Companies".to_string(),
            Self::Series(ticker) => format!("{}_timeseries", ticker),
        }
    }

    /// File name for `format`.
    pub fn file_name(&self, format: ExportFormat) -> String {
        format!("{}.{}", self.file_stem(), format.extension())
    }

    /// Full output path under `dir`.
    pub fn path_in(&self, dir: &Path, format: ExportFormat) -> PathBuf {
        dir.join(self.file_name(format))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn company(ticker: &str, shares: Option<i64>) -> TopCompany {
        TopCompany {
            ticker: ticker.to_string(),
            sector_name: "Tech".to_string(),
            shares,
            last_close_price_usd: Some(12.5),
            average_position_usd: 2000.0,
        }
    }

    #[test]
    fn test_sector_totals_csv() {
        let totals = vec![
            SectorTotal::new("Tech", 800.0),
            SectorTotal::new("Bio", 150.5),
        ];

        let csv = totals.export_to_string(ExportFormat::Csv).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], "sector_name,total_position_usd");
        assert_eq!(lines[1], "Tech,800.0");
        assert_eq!(lines[2], "Bio,150.5");
    }

    #[test]
    fn test_empty_export_keeps_header() {
        let empty: Vec<PricePoint> = Vec::new();
        let csv = empty.export_to_string(ExportFormat::Csv).unwrap();
        assert_eq!(csv, "date,close_usd\n");

        let json = empty.export_to_string(ExportFormat::Json).unwrap();
        assert_eq!(json, "[]");
    }

    #[test]
    fn test_missing_values_are_empty_fields() {
        let rows = vec![company("AAA", None)];
        let csv = rows.export_to_string(ExportFormat::Csv).unwrap();
        assert!(csv.contains("AAA,Tech,,12.5,2000.0"));
    }

    #[test]
    fn test_price_points_json() {
        let points = vec![PricePoint {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            close_usd: Some(10.0),
        }];

        let json = points.export_to_string(ExportFormat::Json).unwrap();
        assert!(json.contains("\"2024-01-02\""));
        assert!(json.contains("\"close_usd\":10.0"));

        let pretty = points.export_to_string(ExportFormat::PrettyJson).unwrap();
        assert!(pretty.contains("  ")); // Indentation indicates pretty format
    }

    #[test]
    fn test_export_to_file() {
        let dir = std::env::temp_dir().join(format!("sectorlens_export_unit_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = ExportDataset::TopCompanies.path_in(&dir, ExportFormat::Csv);

        vec![company("AAA", Some(350))]
            .export_to_file(&path, ExportFormat::Csv)
            .unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("ticker,sector_name"));
        assert!(content.contains("AAA"));

        std::fs::remove_dir_all(dir).ok();
    }

    #[rstest]
    #[case(ExportDataset::TopSectors, ExportFormat::Csv, "Top_10_Sectors.csv")]
    #[case(ExportDataset::TopCompanies, ExportFormat::Csv, "Top 25% Companies.csv")]
    #[case(ExportDataset::Series("AAPL".to_string()), ExportFormat::Csv, "AAPL_timeseries.csv")]
    #[case(ExportDataset::Series("AAPL".to_string()), ExportFormat::PrettyJson, "AAPL_timeseries.json")]
    fn test_file_names(
        #[case] dataset: ExportDataset,
        #[case] format: ExportFormat,
        #[case] expected: &str,
    ) {
        assert_eq!(dataset.file_name(format), expected);
    }

    #[rstest]
    #[case("csv", ExportFormat::Csv)]
    #[case("JSON", ExportFormat::Json)]
    #[case("pretty-json", ExportFormat::PrettyJson)]
    fn test_parse_format(#[case] input: &str, #[case] expected: ExportFormat) {
        assert_eq!(input.parse::<ExportFormat>().unwrap(), expected);
        assert_eq!(expected.to_string().parse::<ExportFormat>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_format() {
        assert!(matches!(
            "xml".parse::<ExportFormat>(),
            Err(ExportError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_export_format_extension() {
        assert_eq!(ExportFormat::Csv.extension(), "csv");
        assert_eq!(ExportFormat::Json.extension(), "json");
        assert_eq!(ExportFormat::PrettyJson.extension(), "json");
    }
}
