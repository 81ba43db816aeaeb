//! The aggregation pipeline façade.
//!
//! A [`Pipeline`] owns the memoization caches and the processing date; the
//! store connection is passed in per call so that a single scoped connection
//! can serve one render while the caches outlive it.

use crate::daily::{self, DailyPosition};
use crate::lookups;
use crate::memo::{CacheStats, MemoCache};
use crate::quartile::{self, TopCompany};
use crate::range::{DateRange, SectorSelection, SectorSet};
use crate::sectors::{self, SectorTotal};
use crate::series::{self, PricePoint};
use chrono::{NaiveDate, Utc};
use sectorlens_data::{Result, Warehouse};

/// Default number of memoized rollups.
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

/// Pipeline settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Maximum rollup results kept in memory
    pub cache_capacity: usize,
    /// Processing date for trailing windows; today (UTC) when unset
    pub as_of: Option<NaiveDate>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            as_of: None,
        }
    }
}

type RollupKey = (DateRange, SectorSet);

/// Aggregation pipeline with its result caches.
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    rollups: MemoCache<RollupKey, Vec<SectorTotal>>,
    sector_list: MemoCache<(), Vec<String>>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl Pipeline {
    /// Create a pipeline with empty caches.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            rollups: MemoCache::new("sector_rollup", config.cache_capacity),
            sector_list: MemoCache::new("sector_list", 1),
        }
    }

    /// The processing date used for trailing windows.
    pub fn as_of(&self) -> NaiveDate {
        self.config
            .as_of
            .unwrap_or_else(|| Utc::now().date_naive())
    }

    /// Every daily position row.
    pub fn daily_positions(&self, store: &Warehouse) -> Result<Vec<DailyPosition>> {
        daily::daily_positions(store)
    }

    /// Top sectors over `range`, memoized by `(range, sectors)`.
    ///
    /// An empty set returns immediately and is not cached.
    pub fn top_sectors(
        &self,
        store: &Warehouse,
        range: DateRange,
        sectors: &SectorSet,
    ) -> Result<Vec<SectorTotal>> {
        if sectors.is_empty() {
            return Ok(Vec::new());
        }

        self.rollups
            .get_or_try_insert_with((range, sectors.clone()), || {
                sectors::top_sectors(store, &range, sectors)
            })
    }

    /// Top-quartile companies as of [`Pipeline::as_of`].
    pub fn top_companies(&self, store: &Warehouse) -> Result<Vec<TopCompany>> {
        quartile::top_companies(store, self.as_of())
    }

    /// Price history for one ticker.
    pub fn time_series(&self, store: &Warehouse, ticker: &str) -> Result<Vec<PricePoint>> {
        series::time_series(store, ticker)
    }

    /// Distinct tickers.
    pub fn company_list(&self, store: &Warehouse) -> Result<Vec<String>> {
        lookups::fetch_company_list(store)
    }

    /// Distinct sector names, memoized for the life of the pipeline.
    pub fn sector_list(&self, store: &Warehouse) -> Result<Vec<String>> {
        self.sector_list
            .get_or_try_insert_with((), || lookups::fetch_sector_list(store))
    }

    /// Latest position date.
    pub fn latest_date(&self, store: &Warehouse) -> Result<Option<NaiveDate>> {
        lookups::fetch_latest_date(store)
    }

    /// Latest price date.
    pub fn latest_price_date(&self, store: &Warehouse) -> Result<Option<NaiveDate>> {
        lookups::fetch_latest_price_date(store)
    }

    /// Default filter range: the `days` days up to the latest position date.
    ///
    /// `None` when the position table is empty.
    pub fn default_range(&self, store: &Warehouse, days: u32) -> Result<Option<DateRange>> {
        Ok(self
            .latest_date(store)?
            .map(|latest| DateRange::trailing_days(latest, days)))
    }

    /// Turn a filter selection into a concrete sector set.
    pub fn resolve_sectors(
        &self,
        store: &Warehouse,
        selection: &SectorSelection,
    ) -> Result<SectorSet> {
        match selection {
            SectorSelection::All => Ok(self.sector_list(store)?.into_iter().collect()),
            SectorSelection::Only(set) => Ok(set.clone()),
        }
    }

    /// Counters for the rollup cache.
    pub fn rollup_cache_stats(&self) -> CacheStats {
        self.rollups.stats()
    }

    /// Counters for the sector list cache.
    pub fn sector_list_cache_stats(&self) -> CacheStats {
        self.sector_list.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_of_override() {
        let as_of = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let pipeline = Pipeline::new(PipelineConfig {
            as_of: Some(as_of),
            ..PipelineConfig::default()
        });
        assert_eq!(pipeline.as_of(), as_of);
    }

    #[test]
    fn test_default_range_of_empty_store() {
        let store = Warehouse::in_memory().unwrap();
        let pipeline = Pipeline::default();
        assert_eq!(pipeline.default_range(&store, 30).unwrap(), None);
    }
}
