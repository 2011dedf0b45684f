//! Post-fetch consistency errors.
//!
//! These checks are optional for callers: a fetch can succeed and still hand
//! back data that a caller decides not to trust. The checks themselves live
//! next to the data they inspect, in [`crate::trial_balance`] and
//! [`crate::journals`].

use chrono::NaiveDate;
use thiserror::Error;

/// Consistency violations in a fetched result set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The result is empty or a row lacks data it must have.
    #[error("Incomplete data: {0}")]
    IncompleteData(String),

    /// A journal line lacks a required field.
    #[error("Journal line {index} is missing required field '{field}'")]
    MissingField {
        /// Position of the line in the result.
        index: usize,
        /// Name of the missing field.
        field: &'static str,
    },

    /// Two trial balance rows share an account code.
    #[error("Duplicate account code in trial balance: {0}")]
    DuplicateAccountCode(String),

    /// Two journal lines share an identifier.
    #[error("Duplicate journal line ID: {0}")]
    DuplicateLineId(String),

    /// The requested date range is empty.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },
}

impl ValidationError {
    /// Returns the error code used in logs and operator output.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::IncompleteData(_) => "INCOMPLETE_DATA",
            Self::MissingField { .. } => "MISSING_FIELD",
            Self::DuplicateAccountCode(_) => "DUPLICATE_ACCOUNT_CODE",
            Self::DuplicateLineId(_) => "DUPLICATE_LINE_ID",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
        }
    }
}
