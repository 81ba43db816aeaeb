//! Distinct-value and latest-date lookups used to seed filters.

use chrono::NaiveDate;
use sectorlens_data::{Result, Warehouse, parse_date};

/// Distinct sector names, sorted.
pub fn fetch_sector_list(store: &Warehouse) -> Result<Vec<String>> {
    store.query_map(
        "sector_list",
        "SELECT DISTINCT sector_name FROM company ORDER BY sector_name",
        [],
        |row| row.get(0),
    )
}

/// Distinct tickers, sorted.
pub fn fetch_company_list(store: &Warehouse) -> Result<Vec<String>> {
    store.query_map(
        "company_list",
        "SELECT DISTINCT ticker FROM company ORDER BY ticker",
        [],
        |row| row.get(0),
    )
}

fn max_date(store: &Warehouse, name: &str, sql: &str) -> Result<Option<NaiveDate>> {
    let latest: Option<String> = store.query_one(name, sql, [], |row| row.get(0))?;
    latest.as_deref().map(parse_date).transpose()
}

/// Most recent date in the position table.
pub fn fetch_latest_date(store: &Warehouse) -> Result<Option<NaiveDate>> {
    max_date(store, "latest_position_date", "SELECT MAX(date) FROM position")
}

/// Most recent date in the price table.
///
/// Looked up independently of [`fetch_latest_date`]; the two may differ.
pub fn fetch_latest_price_date(store: &Warehouse) -> Result<Option<NaiveDate>> {
    max_date(store, "latest_price_date", "SELECT MAX(date) FROM price")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sectorlens_data::{Company, PositionRecord, PriceRecord};

    #[test]
    fn test_lists_are_distinct() {
        let store = Warehouse::in_memory().unwrap();
        store
            .put_companies(&[
                Company::new(1, "ZETA", "Tech"),
                Company::new(2, "ACME", "Tech"),
                Company::new(3, "BIOX", "Bio"),
            ])
            .unwrap();

        assert_eq!(fetch_sector_list(&store).unwrap(), vec!["Bio", "Tech"]);
        assert_eq!(
            fetch_company_list(&store).unwrap(),
            vec!["ACME", "BIOX", "ZETA"]
        );
    }

    #[test]
    fn test_latest_dates_are_independent() {
        let store = Warehouse::in_memory().unwrap();
        assert_eq!(fetch_latest_date(&store).unwrap(), None);

        store
            .put_companies(&[Company::new(1, "ACME", "Tech")])
            .unwrap();
        let d = |day| NaiveDate::from_ymd_opt(2024, 5, day).unwrap();
        store
            .put_positions(&[PositionRecord::new(1, d(2), Some(1))])
            .unwrap();
        store
            .put_prices(&[PriceRecord::new(1, d(3), Some(1.0))])
            .unwrap();

        assert_eq!(fetch_latest_date(&store).unwrap(), Some(d(2)));
        assert_eq!(fetch_latest_price_date(&store).unwrap(), Some(d(3)));
    }
}
