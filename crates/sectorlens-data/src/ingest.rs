//! CSV ingest of raw facts.
//!
//! Expected headers:
//! - companies: `id,ticker,sector_name`
//! - positions: `company_id,date,shares`
//! - prices: `company_id,date,close_usd`
//!
//! Empty `shares` / `close_usd` fields load as NULL.

use crate::error::Result;
use crate::model::{Company, PositionRecord, PriceRecord};
use crate::warehouse::Warehouse;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use tracing::info;

/// Locations of the three fact files.
#[derive(Debug, Clone)]
pub struct FactFiles {
    /// Company attributes CSV
    pub company: PathBuf,
    /// Daily share counts CSV
    pub position: PathBuf,
    /// Daily close prices CSV
    pub price: PathBuf,
}

/// Row counts loaded by one ingest run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Company rows loaded
    pub companies: usize,
    /// Position rows loaded
    pub positions: usize,
    /// Price rows loaded
    pub prices: usize,
}

/// Deserialize every record from a CSV source with a header row.
pub fn read_records<T, R>(reader: R) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let records = rdr
        .deserialize()
        .collect::<std::result::Result<Vec<T>, csv::Error>>()?;
    Ok(records)
}

fn read_file<T: DeserializeOwned>(path: &PathBuf) -> Result<Vec<T>> {
    read_records(File::open(path)?)
}

/// Load all three fact files into the store.
///
/// Companies are loaded first so that position and price rows can reference
/// them. Rows with an existing key replace the stored row.
pub fn ingest(store: &Warehouse, files: &FactFiles) -> Result<IngestSummary> {
    load(store, files, false)
}

/// Empty the store, then load all three fact files.
///
/// The files are parsed before anything is deleted, so a malformed file
/// leaves the store untouched.
pub fn replace_facts(store: &Warehouse, files: &FactFiles) -> Result<IngestSummary> {
    load(store, files, true)
}

fn load(store: &Warehouse, files: &FactFiles, replace: bool) -> Result<IngestSummary> {
    let companies: Vec<Company> = read_file(&files.company)?;
    let positions: Vec<PositionRecord> = read_file(&files.position)?;
    let prices: Vec<PriceRecord> = read_file(&files.price)?;

    if replace {
        store.clear_all()?;
    }

    let summary = IngestSummary {
        companies: store.put_companies(&companies)?,
        positions: store.put_positions(&positions)?,
        prices: store.put_prices(&prices)?,
    };

    info!(
        companies = summary.companies,
        positions = summary.positions,
        prices = summary.prices,
        replace,
        "facts loaded"
    );
    Ok(summary)
}
