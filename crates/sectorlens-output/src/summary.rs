//! Headline figures for the dashboard views.
//!
//! [`CompanyKpis`] summarizes the top-quartile table and [`PriceStats`]
//! summarizes one ticker's close history.

use crate::export::ExportError;
use crate::frame::ToDataFrame;
use polars::prelude::*;
use sectorlens_pipeline::{PricePoint, TopCompany};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key figures of the top-companies table.
///
/// Every figure is absent for an empty table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyKpis {
    /// Number of companies listed.
    pub companies: usize,

    /// Sector with the highest mean `average_position_usd`.
    pub top_sector: Option<String>,

    /// Largest `average_position_usd` in the table.
    pub largest_average_usd: Option<f64>,
}

/// Compute the key figures of a top-companies table.
///
/// The per-sector means are computed with a polars group-by. Ties between
/// sector means go to the alphabetically first sector.
///
/// # Examples
///
/// ```
/// use sectorlens_output::company_kpis;
/// use sectorlens_pipeline::TopCompany;
///
/// let kpis = company_kpis(&[TopCompany {
///     ticker: "AAA".to_string(),
///     sector_name: "Tech".to_string(),
///     shares: Some(10),
///     last_close_price_usd: Some(5.0),
///     average_position_usd: 50.0,
/// }])?;
///
/// assert_eq!(kpis.companies, 1);
/// assert_eq!(kpis.top_sector.as_deref(), Some("Tech"));
/// # Ok::<(), sectorlens_output::ExportError>(())
/// ```
pub fn company_kpis(rows: &[TopCompany]) -> Result<CompanyKpis, ExportError> {
    if rows.is_empty() {
        return Ok(CompanyKpis::default());
    }

    let by_sector = rows
        .to_dataframe()?
        .lazy()
        .group_by([col("sector_name")])
        .agg([col("average_position_usd").mean().alias("mean_average_usd")])
        .collect()?;

    let names = by_sector.column("sector_name")?.str()?;
    let means = by_sector.column("mean_average_usd")?.f64()?;

    let mut top_sector: Option<(&str, f64)> = None;
    for (name, mean) in names.into_iter().zip(means.into_iter()) {
        let (Some(name), Some(mean)) = (name, mean) else {
            continue;
        };
        let better = match top_sector {
            None => true,
            Some((best_name, best_mean)) => {
                mean > best_mean || (mean == best_mean && name < best_name)
            }
        };
        if better {
            top_sector = Some((name, mean));
        }
    }

    let largest_average_usd = rows
        .iter()
        .map(|r| r.average_position_usd)
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))));

    Ok(CompanyKpis {
        companies: rows.len(),
        top_sector: top_sector.map(|(name, _)| name.to_string()),
        largest_average_usd,
    })
}

/// Close price statistics of one ticker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceStats {
    /// Highest close.
    pub highest: f64,

    /// Lowest close.
    pub lowest: f64,

    /// Mean close.
    pub average: f64,
}

impl PriceStats {
    /// Statistics over the non-NULL closes of `points`.
    ///
    /// Returns `None` when no close is present.
    pub fn from_points(points: &[PricePoint]) -> Option<Self> {
        let closes: Vec<f64> = points.iter().filter_map(|p| p.close_usd).collect();
        if closes.is_empty() {
            return None;
        }

        let highest = closes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let lowest = closes.iter().copied().fold(f64::INFINITY, f64::min);
        let average = closes.iter().sum::<f64>() / closes.len() as f64;

        Some(Self {
            highest,
            lowest,
            average,
        })
    }
}

impl fmt::Display for PriceStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Highest Price: ${:.2}  Lowest Price: ${:.2}  Average Price: ${:.2}",
            self.highest, self.lowest, self.average
        )
    }
}
