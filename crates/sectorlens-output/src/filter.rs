//! Row filters for the top-companies table.

use sectorlens_pipeline::{SectorSelection, TopCompany};

/// Sector and free-text filter over top-company rows.
#[derive(Debug, Clone, Default)]
pub struct CompanyFilter {
    sectors: SectorSelection,
    search: Option<String>,
}

impl CompanyFilter {
    /// A filter that keeps every row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only rows in the selected sectors.
    pub fn sectors(mut self, sectors: SectorSelection) -> Self {
        self.sectors = sectors;
        self
    }

    /// Keep only rows whose ticker or sector contains `term`, ignoring case.
    ///
    /// A blank term disables the search.
    pub fn search(mut self, term: impl AsRef<str>) -> Self {
        let term = term.as_ref().trim();
        self.search = (!term.is_empty()).then(|| term.to_lowercase());
        self
    }

    /// Whether `row` passes the filter.
    pub fn matches(&self, row: &TopCompany) -> bool {
        let in_sector = match &self.sectors {
            SectorSelection::All => true,
            SectorSelection::Only(set) => set.iter().any(|s| s == row.sector_name),
        };

        in_sector
            && self.search.as_deref().is_none_or(|term| {
                row.ticker.to_lowercase().contains(term)
                    || row.sector_name.to_lowercase().contains(term)
            })
    }

    /// The rows that pass the filter, in their original order.
    pub fn apply(&self, rows: &[TopCompany]) -> Vec<TopCompany> {
        rows.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn rows() -> Vec<TopCompany> {
        [("AAPL", "Tech"), ("MRNA", "Bio"), ("XOM", "Energy")]
            .into_iter()
            .map(|(ticker, sector)| TopCompany {
                ticker: ticker.to_string(),
                sector_name: sector.to_string(),
                shares: Some(1),
                last_close_price_usd: Some(1.0),
                average_position_usd: 1.0,
            })
            .collect()
    }

    fn tickers(rows: &[TopCompany]) -> Vec<&str> {
        rows.iter().map(|r| r.ticker.as_str()).collect()
    }

    #[test]
    fn test_default_keeps_everything() {
        assert_eq!(CompanyFilter::new().apply(&rows()).len(), 3);
    }

    #[rstest]
    #[case("aapl", vec!["AAPL"])]
    #[case("BIO", vec!["MRNA"])]
    #[case("e", vec!["AAPL", "XOM"])]
    #[case("   ", vec!["AAPL", "MRNA", "XOM"])]
    #[case("zzz", vec![])]
    fn test_search_is_case_insensitive(#[case] term: &str, #[case] expected: Vec<&str>) {
        let rows = rows();
        let filtered = CompanyFilter::new().search(term).apply(&rows);
        assert_eq!(tickers(&filtered), expected);
    }

    #[test]
    fn test_sector_and_search_combine() {
        let rows = rows();
        let filter = CompanyFilter::new()
            .sectors(SectorSelection::from_choices(&["Tech", "Energy"]))
            .search("x");
        assert_eq!(tickers(&filter.apply(&rows)), vec!["XOM"]);
    }

    #[test]
    fn test_all_choice_keeps_every_sector() {
        let rows = rows();
        let filter = CompanyFilter::new().sectors(SectorSelection::from_choices(&["All", "Bio"]));
        assert_eq!(filter.apply(&rows).len(), 3);
    }
}
