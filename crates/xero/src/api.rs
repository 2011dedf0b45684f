//! The seam between fetchers and the accounting platform.

use async_trait::async_trait;
use chrono::NaiveDate;
use ledgerlink_core::journals::DateWindow;
use ledgerlink_core::schema::RawDocument;
use ledgerlink_shared::types::PageRequest;

use crate::error::FetchResult;

/// Raw access to the accounting platform's endpoints.
///
/// Implementations perform exactly one request per call and never retry.
/// A response without a body is `Ok(None)`.
#[async_trait]
pub trait AccountingApi: Send + Sync {
    /// Fetches the trial balance report as of `date`.
    async fn trial_balance(&self, tenant_id: &str, date: NaiveDate)
    -> FetchResult<Option<RawDocument>>;

    /// Fetches one page of journals.
    async fn journals(
        &self,
        tenant_id: &str,
        query: &JournalsQuery,
    ) -> FetchResult<Option<RawDocument>>;

    /// Lists the tenants the credential can access.
    async fn connections(&self) -> FetchResult<Option<RawDocument>>;
}

/// Parameters of one journals page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JournalsQuery {
    /// Posting date range, sent as a server-side filter.
    pub window: DateWindow,
    /// Offset and page size.
    pub page: PageRequest,
}

impl JournalsQuery {
    /// Sort order requested from the server.
    pub const ORDER: &'static str = "JournalDate ASC";

    /// Server-side filter expression for the date range.
    #[must_use]
    pub fn where_clause(&self) -> String {
        format!(
            "JournalDate>=DateTime({}) AND JournalDate<=DateTime({})",
            self.window.start().format("%Y,%m,%d"),
            self.window.end().format("%Y,%m,%d"),
        )
    }

    /// Query string pairs for the request.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("where", self.where_clause()),
            ("order", Self::ORDER.to_string()),
            ("offset", self.page.offset.to_string()),
            ("pageSize", self.page.page_size.to_string()),
        ]
    }
}
