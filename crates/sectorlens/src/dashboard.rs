//! Dashboard views assembled from pipeline results.
//!
//! Each builder works against an already-open store; [`crate::SectorLens`]
//! owns the connection scope.

use crate::error::Result;
use chrono::NaiveDate;
use sectorlens_data::Warehouse;
use sectorlens_output::{CompanyFilter, CompanyKpis, PriceStats, company_kpis};
use sectorlens_pipeline::{
    DateRange, Pipeline, PricePoint, SectorSelection, SectorSet, SectorTotal, TopCompany,
};
use serde::Serialize;
use std::fmt;

/// Informational message shown in place of an empty view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Notice {
    /// The sector selection is empty.
    NoSectorSelected,
    /// The rollup returned no rows.
    NoSectorData,
    /// No company is selected for the time series view.
    NoCompanySelected,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSectorSelected => write!(f, "Please select at least one sector to compare."),
            Self::NoSectorData => write!(f, "No data available for the selected sectors."),
            Self::NoCompanySelected => write!(f, "Please select at least one company to display"),
        }
    }
}

/// User choices for one dashboard render.
#[derive(Debug, Clone, Default)]
pub struct DashboardRequest {
    /// Range start; defaults to the range end minus the configured days.
    pub start: Option<NaiveDate>,
    /// Range end; defaults to the latest position date.
    pub end: Option<NaiveDate>,
    /// Sectors to compare.
    pub sectors: SectorSelection,
    /// Filter applied to the displayed top-companies rows.
    pub company_filter: CompanyFilter,
    /// Tickers to chart; `None` selects the first ticker.
    pub tickers: Option<Vec<String>>,
}

/// Top-sector comparison.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SectorView {
    /// Resolved date range, absent when the store holds no positions.
    pub range: Option<DateRange>,
    /// Resolved sector names.
    pub sectors: Vec<String>,
    /// Rollup rows, largest first.
    pub totals: Vec<SectorTotal>,
    /// Set when there is nothing to show.
    pub notice: Option<Notice>,
}

/// Top-quartile companies with their headline figures.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CompanyView {
    /// Full top-quartile table.
    pub companies: Vec<TopCompany>,
    /// Rows that pass the company filter.
    pub shown: Vec<TopCompany>,
    /// Figures over the full table.
    pub kpis: CompanyKpis,
}

/// Price history of one ticker.
#[derive(Debug, Clone, Serialize)]
pub struct TickerSeries {
    /// Ticker.
    pub ticker: String,
    /// Close history, oldest first.
    pub points: Vec<PricePoint>,
    /// Close statistics, absent when there are no closes.
    pub stats: Option<PriceStats>,
}

/// Time series comparison.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SeriesView {
    /// One entry per selected ticker, in selection order.
    pub series: Vec<TickerSeries>,
    /// Set when no ticker is selected.
    pub notice: Option<Notice>,
}

/// Everything one render produces.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardView {
    /// Latest position date in the store.
    pub latest_date: Option<NaiveDate>,
    /// Top-sector comparison.
    pub sectors: SectorView,
    /// Top-quartile companies.
    pub companies: CompanyView,
    /// Time series comparison.
    pub series: SeriesView,
}

impl DashboardView {
    /// Notices raised by any view, in display order.
    pub fn notices(&self) -> Vec<Notice> {
        [self.sectors.notice, self.series.notice]
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Resolve the sector rollup range from optional bounds.
///
/// The end defaults to the latest position date and the start to `days`
/// before the end. Returns `None` when no end can be found.
pub fn resolve_range(
    store: &Warehouse,
    pipeline: &Pipeline,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    days: u32,
) -> Result<Option<DateRange>> {
    let end = match end {
        Some(end) => end,
        None => match pipeline.latest_date(store)? {
            Some(latest) => latest,
            None => return Ok(None),
        },
    };

    let range = match start {
        Some(start) => DateRange::new(start, end)?,
        None => DateRange::trailing_days(end, days),
    };
    Ok(Some(range))
}

/// Build the top-sector comparison.
pub fn sector_view(
    store: &Warehouse,
    pipeline: &Pipeline,
    range: Option<DateRange>,
    selection: &SectorSelection,
) -> Result<SectorView> {
    let sectors: SectorSet = pipeline.resolve_sectors(store, selection)?;
    let names = sectors.iter().map(str::to_string).collect();

    if sectors.is_empty() {
        return Ok(SectorView {
            range,
            sectors: names,
            totals: Vec::new(),
            notice: Some(Notice::NoSectorSelected),
        });
    }

    let totals = match range {
        Some(range) => pipeline.top_sectors(store, range, &sectors)?,
        None => Vec::new(),
    };
    let notice = totals.is_empty().then_some(Notice::NoSectorData);

    Ok(SectorView {
        range,
        sectors: names,
        totals,
        notice,
    })
}

/// Build the top-quartile company view.
pub fn company_view(
    store: &Warehouse,
    pipeline: &Pipeline,
    filter: &CompanyFilter,
) -> Result<CompanyView> {
    let companies = pipeline.top_companies(store)?;
    let kpis = company_kpis(&companies)?;
    let shown = filter.apply(&companies);

    Ok(CompanyView {
        companies,
        shown,
        kpis,
    })
}

/// Build the time series view.
///
/// With no explicit selection the first ticker in the company list is shown.
pub fn series_view(
    store: &Warehouse,
    pipeline: &Pipeline,
    tickers: Option<&[String]>,
) -> Result<SeriesView> {
    let selected = match tickers {
        Some(tickers) => tickers.to_vec(),
        None => pipeline
            .company_list(store)?
            .into_iter()
            .take(1)
            .collect(),
    };

    if selected.is_empty() {
        return Ok(SeriesView {
            series: Vec::new(),
            notice: Some(Notice::NoCompanySelected),
        });
    }

    let series = selected
        .into_iter()
        .map(|ticker| {
            let points = pipeline.time_series(store, &ticker)?;
            let stats = PriceStats::from_points(&points);
            Ok(TickerSeries {
                ticker,
                points,
                stats,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(SeriesView {
        series,
        notice: None,
    })
}

/// Build all three views.
pub fn render(
    store: &Warehouse,
    pipeline: &Pipeline,
    request: &DashboardRequest,
    default_range_days: u32,
) -> Result<DashboardView> {
    let latest_date = pipeline.latest_date(store)?;
    let range = resolve_range(
        store,
        pipeline,
        request.start,
        request.end,
        default_range_days,
    )?;

    Ok(DashboardView {
        latest_date,
        sectors: sector_view(store, pipeline, range, &request.sectors)?,
        companies: company_view(store, pipeline, &request.company_filter)?,
        series: series_view(store, pipeline, request.tickers.as_deref())?,
    })
}
