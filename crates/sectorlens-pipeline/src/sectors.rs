//! Sector rollup: total position value per sector over a date range.

use crate::range::{DateRange, SectorSet};
use rusqlite::params_from_iter;
use sectorlens_data::{Result, Warehouse};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Maximum number of sectors a rollup returns.
pub const TOP_SECTOR_LIMIT: usize = 10;

/// Summed position value of one sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorTotal {
    /// Sector name
    pub sector_name: String,
    /// Sum of daily position values across the range
    pub total_position_usd: f64,
}

impl SectorTotal {
    /// Create a new sector total.
    pub fn new(sector_name: impl Into<String>, total_position_usd: f64) -> Self {
        Self {
            sector_name: sector_name.into(),
            total_position_usd,
        }
    }
}

/// Build the rollup statement for `sector_count` bound sector names.
///
/// `?1` and `?2` are the range bounds; sectors bind from `?3` onward. Only
/// placeholders are generated here, never values.
fn sector_rollup_sql(sector_count: usize) -> String {
    let placeholders = (0..sector_count)
        .map(|i| format!("?{}", i + 3))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "
    WITH daily_position AS (
        SELECT
            p.date,
            c.sector_name,
            COALESCE(p.shares, 0) * COALESCE(pr.close_usd, 0.0) AS daily_position_usd
        FROM
            position p
        INNER JOIN
            price pr ON p.company_id = pr.company_id AND p.date = pr.date
        INNER JOIN
            company c ON p.company_id = c.id
        WHERE
            p.date BETWEEN ?1 AND ?2
            AND c.sector_name IN ({placeholders})
    ),
    sector_by_day AS (
        SELECT
            date,
            sector_name,
            SUM(daily_position_usd) AS total_position_usd
        FROM
            daily_position
        GROUP BY
            date, sector_name
    )
    SELECT
        sector_name,
        SUM(total_position_usd) AS total_position_usd
    FROM
        sector_by_day
    GROUP BY
        sector_name
    ORDER BY
        total_position_usd DESC, sector_name ASC
    LIMIT {TOP_SECTOR_LIMIT}"
    )
}

/// Top sectors by total position value over `range`.
///
/// An empty sector set returns an empty result without touching the store.
/// Sectors with no matching rows are absent rather than reported as zero.
pub fn top_sectors(
    store: &Warehouse,
    range: &DateRange,
    sectors: &SectorSet,
) -> Result<Vec<SectorTotal>> {
    if sectors.is_empty() {
        debug!("empty sector selection, skipping rollup");
        return Ok(Vec::new());
    }

    let sql = sector_rollup_sql(sectors.len());
    let values = [range.start().to_string(), range.end().to_string()]
        .into_iter()
        .chain(sectors.iter().map(str::to_string));

    store.query_map("sector_rollup", &sql, params_from_iter(values), |row| {
        Ok(SectorTotal {
            sector_name: row.get(0)?,
            total_position_usd: row.get(1)?,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_follow_range_bounds() {
        let sql = sector_rollup_sql(3);
        assert!(sql.contains("IN (?3, ?4, ?5)"));
        assert!(sql.contains("BETWEEN ?1 AND ?2"));
        assert!(sql.contains("LIMIT 10"));
    }

    #[test]
    fn test_empty_set_issues_no_query() {
        let store = Warehouse::in_memory().unwrap();
        let range = DateRange::trailing_days(chrono::NaiveDate::MAX, 1);

        let result = top_sectors(&store, &range, &SectorSet::default()).unwrap();
        assert!(result.is_empty());
        assert_eq!(store.queries_issued(), 0);
    }
}
