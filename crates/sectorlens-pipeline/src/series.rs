//! Close price history for a single company.

use chrono::NaiveDate;
use sectorlens_data::{Result, Warehouse, parse_date};
use serde::{Deserialize, Serialize};

/// One close price observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Trading day
    pub date: NaiveDate,
    /// Close in USD, as stored (may be NULL)
    pub close_usd: Option<f64>,
}

const TIME_SERIES_SQL: &str = "
    SELECT
        p.date,
        p.close_usd
    FROM
        price p
    INNER JOIN
        company c ON p.company_id = c.id
    WHERE
        c.ticker = ?1
    ORDER BY
        p.date";

/// Full price history for `ticker`, oldest first.
///
/// The ticker match is exact and case-sensitive. An unknown ticker yields an
/// empty series.
pub fn time_series(store: &Warehouse, ticker: &str) -> Result<Vec<PricePoint>> {
    let raw = store.query_map("time_series", TIME_SERIES_SQL, [ticker], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, Option<f64>>(1)?))
    })?;

    raw.into_iter()
        .map(|(date, close_usd)| {
            Ok(PricePoint {
                date: parse_date(&date)?,
                close_usd,
            })
        })
        .collect()
}
