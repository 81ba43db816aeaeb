//! Raw fact rows held by the store.
//!
//! These mirror the three source tables one-to-one. Derived rows (daily
//! positions, sector totals, rankings) live in the pipeline crate.

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format used for every date column in the store.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a stored `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| DataError::Parse(format!("Invalid date '{}': {}", s, e)))
}

/// Static company attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    /// Company identifier
    pub id: i64,
    /// Display ticker (unique)
    pub ticker: String,
    /// Sector name (shared between companies)
    pub sector_name: String,
}

impl Company {
    /// Create a new company row.
    pub fn new(id: i64, ticker: impl Into<String>, sector_name: impl Into<String>) -> Self {
        Self {
            id,
            ticker: ticker.into(),
            sector_name: sector_name.into(),
        }
    }
}

/// Shares held in a company on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRecord {
    /// Referenced company
    pub company_id: i64,
    /// Trading day
    pub date: NaiveDate,
    /// Share count; `None` is stored as NULL
    pub shares: Option<i64>,
}

impl PositionRecord {
    /// Create a new position row.
    pub const fn new(company_id: i64, date: NaiveDate, shares: Option<i64>) -> Self {
        Self {
            company_id,
            date,
            shares,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match self.shares {
            Some(shares) if shares < 0 => Err(DataError::InvalidRecord(format!(
                "negative shares {} for company {} on {}",
                shares, self.company_id, self.date
            ))),
            _ => Ok(()),
        }
    }
}

/// Close price of a company on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Referenced company
    pub company_id: i64,
    /// Trading day
    pub date: NaiveDate,
    /// Close in USD; `None` is stored as NULL
    pub close_usd: Option<f64>,
}

impl PriceRecord {
    /// Create a new price row.
    pub const fn new(company_id: i64, date: NaiveDate, close_usd: Option<f64>) -> Self {
        Self {
            company_id,
            date,
            close_usd,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match self.close_usd {
            Some(close) if !close.is_finite() || close < 0.0 => {
                Err(DataError::InvalidRecord(format!(
                    "invalid close {} for company {} on {}",
                    close, self.company_id, self.date
                )))
            }
            _ => Ok(()),
        }
    }
}
