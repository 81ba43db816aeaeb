//! Daily position value: shares held times close price.

use chrono::NaiveDate;
use sectorlens_data::{Result, Warehouse, parse_date};
use serde::{Deserialize, Serialize};

/// One company's position value on one trading day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPosition {
    /// Company identifier
    pub company_id: i64,
    /// Trading day
    pub date: NaiveDate,
    /// Shares held (NULL read as zero)
    pub shares: i64,
    /// Close price in USD (NULL read as zero)
    pub close_usd: f64,
    /// `shares * close_usd`
    pub daily_position_usd: f64,
}

/// Inner join of position and price on `(company_id, date)`.
///
/// NULL shares or close within a matched pair count as zero, but a pair
/// missing from either table produces no row at all.
const DAILY_POSITION_SQL: &str = "
    SELECT
        pos.company_id,
        pos.date,
        COALESCE(pos.shares, 0) AS shares,
        COALESCE(pr.close_usd, 0.0) AS close_usd,
        COALESCE(pos.shares, 0) * COALESCE(pr.close_usd, 0.0) AS daily_position_usd
    FROM
        position pos
    INNER JOIN
        price pr
    ON
        pos.company_id = pr.company_id AND pos.date = pr.date
    ORDER BY
        pos.company_id, pos.date";

/// Every daily position row, ordered by company then date.
pub fn daily_positions(store: &Warehouse) -> Result<Vec<DailyPosition>> {
    let raw = store.query_map("daily_position", DAILY_POSITION_SQL, [], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, i64>(2)?,
            row.get::<_, f64>(3)?,
            row.get::<_, f64>(4)?,
        ))
    })?;

    raw.into_iter()
        .map(|(company_id, date, shares, close_usd, daily_position_usd)| {
            Ok(DailyPosition {
                company_id,
                date: parse_date(&date)?,
                shares,
                close_usd,
                daily_position_usd,
            })
        })
        .collect()
}
