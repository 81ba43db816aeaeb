//! The application handle.

use crate::dashboard::{self, DashboardRequest, DashboardView};
use crate::error::{Error, Result};
use crate::settings::Settings;
use crate::store::open_store;
use chrono::NaiveDate;
use sectorlens_data::{FactFiles, IngestSummary, Warehouse, ingest, replace_facts};
use sectorlens_output::{ExportDataset, ExportFormat, Exporter};
use sectorlens_pipeline::{Pipeline, SectorSelection};
use std::path::{Path, PathBuf};
use tracing::info;

/// What to export and how.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    /// Result table to export.
    pub dataset: ExportDataset,
    /// Output format.
    pub format: ExportFormat,
    /// Sector rollup range start.
    pub start: Option<NaiveDate>,
    /// Sector rollup range end.
    pub end: Option<NaiveDate>,
    /// Sectors for the rollup.
    pub sectors: SectorSelection,
}

impl ExportRequest {
    /// Export `dataset` as CSV with default range and sectors.
    pub fn new(dataset: ExportDataset) -> Self {
        Self {
            dataset,
            format: ExportFormat::Csv,
            start: None,
            end: None,
            sectors: SectorSelection::All,
        }
    }
}

/// Settings plus the pipeline caches that outlive individual connections.
#[derive(Debug)]
pub struct SectorLens {
    settings: Settings,
    pipeline: Pipeline,
}

impl SectorLens {
    /// Create the application with empty caches.
    pub fn new(settings: Settings) -> Self {
        let pipeline = Pipeline::new(settings.pipeline_config());
        Self { settings, pipeline }
    }

    /// Active settings.
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The shared pipeline.
    pub const fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Run `f` against a freshly opened store and close it afterwards.
    ///
    /// The store is closed whether or not `f` succeeds. When `f` fails its
    /// error is returned and a close failure is only logged.
    pub fn with_store<T, E, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Warehouse, &Pipeline) -> std::result::Result<T, E>,
        Error: From<E>,
    {
        let store = open_store(&self.settings.database_path)?;
        let outcome = f(&store, &self.pipeline);
        let closed = store.close();

        let value = outcome?;
        closed?;
        Ok(value)
    }

    /// Load the three fact files into the store.
    pub fn load_facts(&self, files: &FactFiles) -> Result<IngestSummary> {
        self.with_store(|store, _| ingest(store, files))
    }

    /// Empty the store and load the three fact files in its place.
    pub fn replace_facts(&self, files: &FactFiles) -> Result<IngestSummary> {
        self.with_store(|store, _| replace_facts(store, files))
    }

    /// Render every dashboard view.
    pub fn render_dashboard(&self, request: &DashboardRequest) -> Result<DashboardView> {
        let days = self.settings.default_range_days;
        self.with_store(|store, pipeline| dashboard::render(store, pipeline, request, days))
    }

    /// Export one result table into `dir` and return the written path.
    pub fn export(&self, request: &ExportRequest, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir).map_err(sectorlens_output::ExportError::from)?;
        let path = request.dataset.path_in(dir, request.format);
        let days = self.settings.default_range_days;

        let rows = self.with_store(|store, pipeline| -> Result<usize> {
            match &request.dataset {
                ExportDataset::TopSectors => {
                    let range =
                        dashboard::resolve_range(store, pipeline, request.start, request.end, days)?;
                    let view = dashboard::sector_view(store, pipeline, range, &request.sectors)?;
                    view.totals.export_to_file(&path, request.format)?;
                    Ok(view.totals.len())
                }
                ExportDataset::TopCompanies => {
                    let companies = pipeline.top_companies(store)?;
                    companies.export_to_file(&path, request.format)?;
                    Ok(companies.len())
                }
                ExportDataset::Series(ticker) => {
                    let points = pipeline.time_series(store, ticker)?;
                    points.export_to_file(&path, request.format)?;
                    Ok(points.len())
                }
            }
        })?;

        info!(path = %path.display(), rows, format = %request.format, "exported");
        Ok(path)
    }
}
