//! Fetch request types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Request for a trial balance as of a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceRequest {
    /// Tenant to query.
    pub tenant_id: String,
    /// Report date.
    pub end_date: NaiveDate,
}

impl TrialBalanceRequest {
    /// Creates a request.
    pub fn new(tenant_id: impl Into<String>, end_date: NaiveDate) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            end_date,
        }
    }
}

/// Request for journal lines posted within a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalsRequest {
    /// Tenant to query.
    pub tenant_id: String,
    /// First posting date, inclusive.
    pub start_date: NaiveDate,
    /// Last posting date, inclusive.
    pub end_date: NaiveDate,
    /// Account codes to restrict to. Empty means all accounts.
    #[serde(default)]
    pub nominals: Vec<String>,
    /// Page size. Falls back to the configured default.
    #[serde(default)]
    pub page_size: Option<u32>,
    /// Starting offset. Defaults to zero.
    #[serde(default)]
    pub offset: Option<u64>,
}

impl JournalsRequest {
    /// Creates a request over all accounts starting at offset zero.
    pub fn new(tenant_id: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            start_date,
            end_date,
            nominals: Vec::new(),
            page_size: None,
            offset: None,
        }
    }

    /// Restricts the fetch to the given account codes.
    #[must_use]
    pub fn with_nominals<I, S>(mut self, nominals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nominals = nominals.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the page size.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Sets the starting offset.
    #[must_use]
    pub const fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }
}
