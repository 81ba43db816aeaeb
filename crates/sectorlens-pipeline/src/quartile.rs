//! Top-quartile companies by trailing-12-month average position.
//!
//! Companies are ranked descending by their average daily position value
//! over the trailing window and split into four contiguous buckets. Bucket
//! sizes differ by at most one; when the count is not divisible by four the
//! remainder goes to the earliest buckets, so the top bucket holds
//! `ceil(n / 4)` companies.

use chrono::{Months, NaiveDate};
use rusqlite::params;
use sectorlens_data::{Result, Warehouse};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of buckets in a quartile split.
const QUARTILES: usize = 4;

/// A company in the top quartile, with its latest holdings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopCompany {
    /// Display ticker
    pub ticker: String,
    /// Sector name
    pub sector_name: String,
    /// Shares on the latest position date
    pub shares: Option<i64>,
    /// Close on the latest price date
    pub last_close_price_usd: Option<f64>,
    /// Mean daily position value over the trailing window
    pub average_position_usd: f64,
}

/// Sizes of `buckets` contiguous near-equal buckets over `n` items.
///
/// The first `n % buckets` buckets hold one extra item.
pub fn bucket_sizes(n: usize, buckets: usize) -> Vec<usize> {
    if buckets == 0 {
        return Vec::new();
    }
    let base = n / buckets;
    let remainder = n % buckets;
    (0..buckets)
        .map(|i| base + usize::from(i < remainder))
        .collect()
}

/// Quartile bucket sizes for `n` ranked companies.
pub fn quartile_sizes(n: usize) -> [usize; QUARTILES] {
    let sizes = bucket_sizes(n, QUARTILES);
    [sizes[0], sizes[1], sizes[2], sizes[3]]
}

/// 1-based bucket of each of `n` ranked items, in rank order.
pub fn ntile(n: usize, buckets: usize) -> Vec<usize> {
    bucket_sizes(n, buckets)
        .into_iter()
        .enumerate()
        .flat_map(|(bucket, size)| std::iter::repeat_n(bucket + 1, size))
        .collect()
}

/// Averages over `[?1, ?2]`, every averaged company, best first.
///
/// The latest position and price are each taken on their own table's
/// maximum date. They are left-joined here so that bucketing sees every
/// ranked company; companies missing either latest row are dropped after
/// bucketing.
const RANKED_AVERAGES_SQL: &str = "
    WITH daily_position AS (
        SELECT
            pos.company_id,
            pos.date,
            COALESCE(pos.shares, 0) * COALESCE(pr.close_usd, 0.0) AS daily_position_usd
        FROM
            position pos
        INNER JOIN
            price pr
        ON
            pos.company_id = pr.company_id AND pos.date = pr.date
    ),
    last_year_data AS (
        SELECT
            company_id,
            daily_position_usd
        FROM
            daily_position
        WHERE
            date >= ?1 AND date <= ?2
    ),
    average_position AS (
        SELECT
            company_id,
            AVG(daily_position_usd) AS average_position_usd
        FROM
            last_year_data
        GROUP BY
            company_id
    ),
    latest_position AS (
        SELECT company_id, shares
        FROM position
        WHERE date = (SELECT MAX(date) FROM position)
    ),
    latest_price AS (
        SELECT company_id, close_usd
        FROM price
        WHERE date = (SELECT MAX(date) FROM price)
    )
    SELECT
        c.ticker,
        c.sector_name,
        a.average_position_usd,
        lp.company_id IS NOT NULL AS has_position,
        lp.shares,
        lpr.company_id IS NOT NULL AS has_price,
        lpr.close_usd
    FROM
        average_position a
    INNER JOIN
        company c ON a.company_id = c.id
    LEFT JOIN
        latest_position lp ON a.company_id = lp.company_id
    LEFT JOIN
        latest_price lpr ON a.company_id = lpr.company_id
    ORDER BY
        a.average_position_usd DESC, a.company_id ASC";

struct RankedRow {
    company: TopCompany,
    has_latest: bool,
}

/// First day of the trailing 12-month window ending on `as_of`.
pub fn trailing_year_start(as_of: NaiveDate) -> NaiveDate {
    as_of
        .checked_sub_months(Months::new(12))
        .unwrap_or(NaiveDate::MIN)
}

/// Top-quartile companies for the window `[as_of - 12 months, as_of]`.
///
/// Companies with no matched days in the window are not ranked. An empty
/// position or price table gives an empty result.
pub fn top_companies(store: &Warehouse, as_of: NaiveDate) -> Result<Vec<TopCompany>> {
    let window_start = trailing_year_start(as_of);

    let ranked = store.query_map(
        "top_quartile",
        RANKED_AVERAGES_SQL,
        params![window_start.to_string(), as_of.to_string()],
        |row| {
            let has_position: bool = row.get(3)?;
            let has_price: bool = row.get(5)?;
            Ok(RankedRow {
                company: TopCompany {
                    ticker: row.get(0)?,
                    sector_name: row.get(1)?,
                    average_position_usd: row.get(2)?,
                    shares: row.get(4)?,
                    last_close_price_usd: row.get(6)?,
                },
                has_latest: has_position && has_price,
            })
        },
    )?;

    let top_bucket = quartile_sizes(ranked.len())[0];
    debug!(ranked = ranked.len(), top_bucket, "quartile split");

    Ok(ranked
        .into_iter()
        .take(top_bucket)
        .filter(|row| row.has_latest)
        .map(|row| row.company)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, [0, 0, 0, 0])]
    #[case(1, [1, 0, 0, 0])]
    #[case(3, [1, 1, 1, 0])]
    #[case(4, [1, 1, 1, 1])]
    #[case(5, [2, 1, 1, 1])]
    #[case(6, [2, 2, 1, 1])]
    #[case(7, [2, 2, 2, 1])]
    #[case(8, [2, 2, 2, 2])]
    #[case(13, [4, 3, 3, 3])]
    fn test_quartile_sizes(#[case] n: usize, #[case] expected: [usize; 4]) {
        let sizes = quartile_sizes(n);
        assert_eq!(sizes, expected);
        assert_eq!(sizes.iter().sum::<usize>(), n);
        assert_eq!(sizes[0], n.div_ceil(4));
    }

    #[test]
    fn test_ntile_is_contiguous() {
        assert_eq!(ntile(6, 4), vec![1, 1, 2, 2, 3, 4]);
        assert_eq!(ntile(0, 4), Vec::<usize>::new());
        assert!(ntile(3, 0).is_empty());
    }

    #[test]
    fn test_trailing_year_start() {
        let leap = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(
            trailing_year_start(leap),
            NaiveDate::from_ymd_opt(2023, 2, 28).unwrap()
        );

        let plain = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert_eq!(
            trailing_year_start(plain),
            NaiveDate::from_ymd_opt(2023, 6, 15).unwrap()
        );
    }

    #[test]
    fn test_empty_store_gives_empty_result() {
        let store = Warehouse::in_memory().unwrap();
        let as_of = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert!(top_companies(&store, as_of).unwrap().is_empty());
    }
}
