//! Filter parameters: inclusive date ranges and sector selections.

use chrono::{Duration, NaiveDate};
use sectorlens_data::{DataError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Pseudo-sector that stands for every sector in the store.
pub const ALL_SECTORS: &str = "All";

/// Inclusive calendar date range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(DataError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// The `days` calendar days leading up to and including `end`.
    ///
    /// `trailing_days(d, 30)` spans `[d - 30, d]`.
    pub fn trailing_days(end: NaiveDate, days: u32) -> Self {
        let start = end
            .checked_sub_signed(Duration::days(i64::from(days)))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    /// First day in the range.
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day in the range.
    pub const fn end(&self) -> NaiveDate {
        self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Normalised set of sector names (sorted, no duplicates).
///
/// Used as part of the rollup memo key, so two selections naming the same
/// sectors in a different order share a cache entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SectorSet(BTreeSet<String>);

impl SectorSet {
    /// Whether no sector is selected.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of selected sectors.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate sector names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for SectorSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// What the user picked in the sector filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SectorSelection {
    /// Every sector in the store
    #[default]
    All,
    /// Exactly these sectors (may be empty)
    Only(SectorSet),
}

impl SectorSelection {
    /// Interpret raw filter choices.
    ///
    /// Any occurrence of [`ALL_SECTORS`] selects everything, even alongside
    /// named sectors. No choices at all is an empty selection.
    pub fn from_choices<S: AsRef<str>>(choices: &[S]) -> Self {
        if choices.iter().any(|c| c.as_ref() == ALL_SECTORS) {
            Self::All
        } else {
            Self::Only(choices.iter().map(|c| c.as_ref().to_string()).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn test_date_range_validation() {
        assert!(DateRange::new(day(1, 1), day(1, 31)).is_ok());
        assert!(DateRange::new(day(1, 1), day(1, 1)).is_ok());
        assert!(matches!(
            DateRange::new(day(2, 1), day(1, 1)),
            Err(DataError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn test_trailing_days() {
        let range = DateRange::trailing_days(day(3, 31), 30);
        assert_eq!(range.start(), day(3, 1));
        assert_eq!(range.end(), day(3, 31));
        assert_eq!(range.to_string(), "2024-03-01 to 2024-03-31");
    }

    #[test]
    fn test_sector_set_normalises() {
        let a: SectorSet = ["Tech", "Bio", "Tech"].into_iter().collect();
        let b: SectorSet = ["Bio", "Tech"].into_iter().collect();
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.iter().collect::<Vec<_>>(), vec!["Bio", "Tech"]);
    }

    #[rstest]
    #[case(vec!["All"], true)]
    #[case(vec!["Tech", "All"], true)]
    #[case(vec!["Tech"], false)]
    #[case(vec![], false)]
    fn test_selection_from_choices(#[case] choices: Vec<&str>, #[case] is_all: bool) {
        let selection = SectorSelection::from_choices(&choices);
        assert_eq!(selection == SectorSelection::All, is_all);
    }

    #[test]
    fn test_empty_selection_stays_empty() {
        let selection = SectorSelection::from_choices::<&str>(&[]);
        assert_eq!(selection, SectorSelection::Only(SectorSet::default()));
    }
}
