//! Journal line types.

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

/// One posted journal line, flattened together with its parent journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    /// Line identifier.
    pub id: String,
    /// Posting date of the parent journal.
    pub date: NaiveDate,
    /// Journal number of the parent journal.
    pub journal_number: Option<String>,
    /// Account code.
    pub account_code: String,
    /// Account name.
    pub account_name: String,
    /// Line description.
    pub description: Option<String>,
    /// Net amount. Never zero in fetched results.
    pub net: Decimal,
    /// Tax amount.
    pub tax: Option<Decimal>,
    /// Gross amount.
    pub gross: Option<Decimal>,
    /// Source type of the parent journal.
    pub source: Option<String>,
    /// Reference of the parent journal.
    pub reference: Option<String>,
}

/// Inclusive range of posting dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// Creates a window, rejecting a start after the end.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// First day in the window.
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day in the window.
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether `date` falls inside the window, bounds included.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Allowlist of account codes. An empty allowlist admits everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NominalFilter {
    codes: HashSet<String>,
}

impl NominalFilter {
    /// A filter that admits every account.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Builds a filter from account codes.
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            codes: codes.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether the filter restricts anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Whether lines for `account_code` pass the filter.
    #[must_use]
    pub fn allows(&self, account_code: &str) -> bool {
        self.codes.is_empty() || self.codes.contains(account_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_inclusive() {
        let window = DateWindow::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        assert!(window.contains(date(2024, 1, 1)));
        assert!(window.contains(date(2024, 1, 31)));
        assert!(!window.contains(date(2023, 12, 31)));
        assert!(!window.contains(date(2024, 2, 1)));
    }

    #[test]
    fn test_window_single_day() {
        let day = date(2024, 3, 15);
        assert!(DateWindow::new(day, day).unwrap().contains(day));
    }

    #[test]
    fn test_window_rejects_inverted_range() {
        assert_eq!(
            DateWindow::new(date(2024, 2, 1), date(2024, 1, 1)),
            Err(ValidationError::InvalidDateRange {
                start: date(2024, 2, 1),
                end: date(2024, 1, 1),
            })
        );
    }

    #[test]
    fn test_empty_filter_allows_all() {
        let filter = NominalFilter::all();
        assert!(filter.is_empty());
        assert!(filter.allows("anything"));
    }

    #[test]
    fn test_filter_allows_listed_only() {
        let filter = NominalFilter::new(["200", "400"]);
        assert!(filter.allows("200"));
        assert!(!filter.allows("260"));
    }
}
