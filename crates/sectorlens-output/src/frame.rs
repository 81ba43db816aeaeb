//! Conversion of result tables into polars DataFrames.
//!
//! Column names match the exported CSV headers. Dates become polars `Date`
//! columns.

use crate::export::ExportError;
use chrono::{DateTime, NaiveDate};
use polars::prelude::*;
use sectorlens_pipeline::{PricePoint, SectorTotal, TopCompany};

/// Conversion of a result table into a [`DataFrame`].
pub trait ToDataFrame {
    /// Build a DataFrame with one row per record.
    ///
    /// # Errors
    ///
    /// Returns an error if polars rejects the columns.
    fn to_dataframe(&self) -> Result<DataFrame, ExportError>;
}

/// Days since the Unix epoch, the physical representation of polars `Date`.
fn epoch_days(date: NaiveDate) -> Result<i32, ExportError> {
    let days = date
        .signed_duration_since(DateTime::UNIX_EPOCH.date_naive())
        .num_days();
    i32::try_from(days).map_err(|_| ExportError::DateOutOfRange(date))
}

fn with_date_column(df: DataFrame) -> Result<DataFrame, ExportError> {
    Ok(df
        .lazy()
        .with_column(col("date").cast(DataType::Date))
        .collect()?)
}

impl ToDataFrame for [SectorTotal] {
    fn to_dataframe(&self) -> Result<DataFrame, ExportError> {
        let names: Vec<&str> = self.iter().map(|t| t.sector_name.as_str()).collect();
        let totals: Vec<f64> = self.iter().map(|t| t.total_position_usd).collect();

        Ok(DataFrame::new(vec![
            Series::new("sector_name".into(), names).into(),
            Series::new("total_position_usd".into(), totals).into(),
        ])?)
    }
}

impl ToDataFrame for [TopCompany] {
    fn to_dataframe(&self) -> Result<DataFrame, ExportError> {
        let tickers: Vec<&str> = self.iter().map(|c| c.ticker.as_str()).collect();
        let sectors: Vec<&str> = self.iter().map(|c| c.sector_name.as_str()).collect();
        let shares: Vec<Option<i64>> = self.iter().map(|c| c.shares).collect();
        let closes: Vec<Option<f64>> = self.iter().map(|c| c.last_close_price_usd).collect();
        let averages: Vec<f64> = self.iter().map(|c| c.average_position_usd).collect();

        Ok(DataFrame::new(vec![
            Series::new("ticker".into(), tickers).into(),
            Series::new("sector_name".into(), sectors).into(),
            Series::new("shares".into(), shares).into(),
            Series::new("last_close_price_usd".into(), closes).into(),
            Series::new("average_position_usd".into(), averages).into(),
        ])?)
    }
}

impl ToDataFrame for [PricePoint] {
    fn to_dataframe(&self) -> Result<DataFrame, ExportError> {
        let dates = self
            .iter()
            .map(|p| epoch_days(p.date))
            .collect::<Result<Vec<i32>, _>>()?;
        let closes: Vec<Option<f64>> = self.iter().map(|p| p.close_usd).collect();

        let df = DataFrame::new(vec![
            Series::new("date".into(), dates).into(),
            Series::new("close_usd".into(), closes).into(),
        ])?;
        with_date_column(df)
    }
}

impl<T> ToDataFrame for Vec<T>
where
    [T]: ToDataFrame,
{
    fn to_dataframe(&self) -> Result<DataFrame, ExportError> {
        self.as_slice().to_dataframe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_days() {
        let days = |y, m, d| epoch_days(NaiveDate::from_ymd_opt(y, m, d).unwrap()).unwrap();
        assert_eq!(days(1970, 1, 1), 0);
        assert_eq!(days(1970, 1, 31), 30);
        assert_eq!(days(1969, 12, 31), -1);
        assert_eq!(days(2024, 1, 2), 19_724);
    }

    #[test]
    fn test_epoch_days_at_calendar_limits() {
        let min = epoch_days(NaiveDate::MIN).unwrap();
        let max = epoch_days(NaiveDate::MAX).unwrap();
        assert!(min < 0 && max > 0);

        let points = vec![PricePoint {
            date: NaiveDate::MAX,
            close_usd: Some(1.0),
        }];
        let df = points.to_dataframe().unwrap();
        assert_eq!(df.column("date").unwrap().dtype(), &DataType::Date);
    }

    #[test]
    fn test_sector_totals_frame() {
        let df = vec![SectorTotal::new("Tech", 800.0), SectorTotal::new("Bio", 10.0)]
            .to_dataframe()
            .unwrap();

        assert_eq!(df.height(), 2);
        let names: Vec<&str> = df.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["sector_name", "total_position_usd"]);
    }

    #[test]
    fn test_price_points_frame_has_date_column() {
        let points = vec![
            PricePoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                close_usd: Some(10.0),
            },
            PricePoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
                close_usd: None,
            },
        ];

        let df = points.to_dataframe().unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.column("date").unwrap().dtype(), &DataType::Date);
        assert_eq!(df.column("close_usd").unwrap().null_count(), 1);
    }

    #[test]
    fn test_empty_company_frame() {
        let df = Vec::<TopCompany>::new().to_dataframe().unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), 5);
    }
}
