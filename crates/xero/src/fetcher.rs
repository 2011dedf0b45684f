//! Trial balance and journal fetchers.

use std::collections::{BTreeMap, HashSet};
use std::future::Future;

use ledgerlink_core::journals::{
    Continuation, DateWindow, JournalLine, NominalFilter, PageOutcome, TransformStats,
    filter_by_nominals, group_by_account, next_request, sort_journals_by_date, transform_page,
};
use ledgerlink_core::retry::{RetryExecutor, RetryPolicy};
use ledgerlink_core::schema::{
    Connection, JournalsPage, RawDocument, validate_connections, validate_journals_page,
    validate_trial_balance,
};
use ledgerlink_core::trial_balance::{FlattenedTrialBalance, TrialBalanceService};
use ledgerlink_shared::types::PageRequest;
use ledgerlink_shared::{AppConfig, JournalSettings, XeroConfig};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::api::{AccountingApi, JournalsQuery};
use crate::error::{FetchError, FetchResult};
use crate::request::{JournalsRequest, TrialBalanceRequest};

/// Journal lines gathered across every page of a fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FetchedJournals {
    /// Lines ordered by posting date, ties in arrival order.
    pub lines: Vec<JournalLine>,
    /// Pages requested.
    pub pages: usize,
    /// What was left out while transforming pages.
    pub stats: TransformStats,
    /// Whether paging stopped early at the offset ceiling.
    pub truncated: bool,
}

/// One explicitly requested page of journal lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalPage {
    /// Lines on the page ordered by posting date.
    pub lines: Vec<JournalLine>,
    /// Whether the page was full, so another may follow.
    pub has_more: bool,
    /// Estimated page count: one past this page, or two when more follow.
    pub total_pages: u32,
}

/// Trial balance with the journals behind it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LedgerSnapshot {
    /// Trial balance as of the end date.
    pub trial_balance: FlattenedTrialBalance,
    /// Journal lines for accounts present in the trial balance.
    pub journals: Vec<JournalLine>,
    /// The same journal lines keyed by account code.
    pub journals_by_account: BTreeMap<String, Vec<JournalLine>>,
}

/// Fetches and normalizes ledger data from an [`AccountingApi`].
///
/// Every network call runs through a [`RetryExecutor`]. Credentials are
/// checked before the first call of every fetch. The fetcher holds no mutable
/// state, so one instance may serve concurrent fetches.
#[derive(Debug)]
pub struct XeroFetcher<A> {
    api: A,
    config: XeroConfig,
    journals: JournalSettings,
    executor: RetryExecutor,
    transient_only: bool,
}

impl<A: AccountingApi> XeroFetcher<A> {
    /// Creates a fetcher using the retry and pagination settings in `config`.
    pub fn new(api: A, config: &AppConfig) -> Self {
        Self {
            api,
            config: config.xero.clone(),
            journals: config.journals.clone(),
            executor: RetryExecutor::new(RetryPolicy::from(&config.retry)),
            transient_only: config.retry.transient_only,
        }
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        let executor = RetryExecutor::new(policy);
        self.executor = match self.executor.cancellation() {
            Some(token) => executor.with_cancellation(token.clone()),
            None => executor,
        };
        self
    }

    /// Aborts fetches with [`FetchError::Cancelled`] once `token` fires.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.executor = self.executor.with_cancellation(token);
        self
    }

    /// Returns the underlying API.
    pub const fn api(&self) -> &A {
        &self.api
    }

    fn ensure_configured(&self) -> FetchResult<()> {
        self.config.credentials()?;
        Ok(())
    }

    fn page_size(&self, request: &JournalsRequest) -> u32 {
        request.page_size.unwrap_or(self.journals.page_size).max(1)
    }

    /// Runs one network call under the retry policy.
    ///
    /// A missing body becomes [`FetchError::EmptyResponse`] inside the retried
    /// operation. Configuration, schema, and validation errors are never
    /// retried; in transient-only mode neither is anything the classifier
    /// calls permanent.
    async fn call<F, Fut>(&self, endpoint: &'static str, mut f: F) -> FetchResult<RawDocument>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = FetchResult<Option<RawDocument>>>,
    {
        let transient_only = self.transient_only;
        self.executor
            .execute_while(
                endpoint,
                |error: &FetchError| {
                    if transient_only {
                        error.is_retryable()
                    } else {
                        !matches!(
                            error,
                            FetchError::NotConfigured(_)
                                | FetchError::SchemaMismatch { .. }
                                | FetchError::Validation(_)
                                | FetchError::Cancelled
                        )
                    }
                },
                || {
                    let response = f();
                    async move { response.await?.ok_or(FetchError::EmptyResponse { endpoint }) }
                },
            )
            .await
            .map_err(FetchError::from)
    }

    /// Fetches the trial balance and flattens it into account rows.
    ///
    /// # Errors
    ///
    /// [`FetchError::NotConfigured`] before any network call when credentials
    /// are missing, [`FetchError::RetryExhausted`] when every attempt failed,
    /// [`FetchError::SchemaMismatch`] for a malformed report, and
    /// [`FetchError::Cancelled`] when cancelled.
    #[instrument(skip(self, request), fields(tenant_id = %request.tenant_id, end_date = %request.end_date))]
    pub async fn fetch_trial_balance(
        &self,
        request: &TrialBalanceRequest,
    ) -> FetchResult<FlattenedTrialBalance> {
        self.ensure_configured()?;

        let document = self
            .call("trial_balance", || {
                self.api.trial_balance(&request.tenant_id, request.end_date)
            })
            .await?;
        let report = validate_trial_balance(&document)?;
        let flattened = TrialBalanceService::flatten(&report);

        info!(
            rows = flattened.rows.len(),
            skipped = flattened.skipped,
            "Trial balance fetched"
        );
        Ok(flattened)
    }

    /// Fetches every page of journals in the requested range.
    ///
    /// Paging stops when the server reports the last page, when a page
    /// without a pagination descriptor comes back short, or with a warning
    /// once the offset passes the configured ceiling. Lines gathered so far
    /// are returned in the last case.
    ///
    /// # Errors
    ///
    /// As [`Self::fetch_trial_balance`], plus [`FetchError::Validation`] for
    /// a start date after the end date, raised before any network call.
    #[instrument(
        skip(self, request),
        fields(tenant_id = %request.tenant_id, start = %request.start_date, end = %request.end_date)
    )]
    pub async fn fetch_journals(&self, request: &JournalsRequest) -> FetchResult<FetchedJournals> {
        self.ensure_configured()?;
        let window = DateWindow::new(request.start_date, request.end_date)?;
        let nominals = NominalFilter::new(request.nominals.iter().cloned());

        let mut current = PageRequest::new(request.offset.unwrap_or(0), self.page_size(request));
        let mut fetched = FetchedJournals::default();

        loop {
            let (page, outcome) = self
                .fetch_page(&request.tenant_id, window, &nominals, current)
                .await?;
            fetched.pages += 1;
            fetched.stats.absorb(outcome.stats);
            let lines_on_page = outcome.lines.len();
            fetched.lines.extend(outcome.lines);

            match next_request(
                current,
                page.pagination.as_ref(),
                lines_on_page,
                self.journals.max_offset,
            ) {
                Continuation::Fetch(next) => current = next,
                Continuation::Done => break,
                Continuation::OffsetCeiling { offset } => {
                    warn!(
                        offset,
                        max_offset = self.journals.max_offset,
                        "Reached maximum offset limit, stopping pagination"
                    );
                    fetched.truncated = true;
                    break;
                }
                Continuation::Stalled { offset } => {
                    warn!(offset, "Pagination did not advance, stopping");
                    break;
                }
            }
        }

        fetched.lines = sort_journals_by_date(filter_by_nominals(fetched.lines, &nominals));

        info!(
            lines = fetched.lines.len(),
            pages = fetched.pages,
            journals_out_of_range = fetched.stats.journals_out_of_range,
            lines_filtered = fetched.stats.lines_filtered,
            lines_zero_amount = fetched.stats.lines_zero_amount,
            truncated = fetched.truncated,
            "Journals fetched"
        );
        Ok(fetched)
    }

    /// Fetches a single zero-indexed page of journals.
    ///
    /// The page starts at `page × page_size`; `request.offset` is ignored.
    #[instrument(skip(self, request), fields(tenant_id = %request.tenant_id))]
    pub async fn fetch_journals_page(
        &self,
        request: &JournalsRequest,
        page: u32,
    ) -> FetchResult<JournalPage> {
        self.ensure_configured()?;
        let window = DateWindow::new(request.start_date, request.end_date)?;
        let nominals = NominalFilter::new(request.nominals.iter().cloned());
        let page_size = self.page_size(request);

        let (_, outcome) = self
            .fetch_page(
                &request.tenant_id,
                window,
                &nominals,
                PageRequest::for_page(page, page_size),
            )
            .await?;

        let has_more = usize::try_from(page_size).is_ok_and(|size| size == outcome.lines.len());
        let total_pages = page.saturating_add(if has_more { 2 } else { 1 });
        Ok(JournalPage {
            lines: sort_journals_by_date(outcome.lines),
            has_more,
            total_pages,
        })
    }

    async fn fetch_page(
        &self,
        tenant_id: &str,
        window: DateWindow,
        nominals: &NominalFilter,
        page: PageRequest,
    ) -> FetchResult<(JournalsPage, PageOutcome)> {
        let query = JournalsQuery { window, page };
        let document = self
            .call("journals", || self.api.journals(tenant_id, &query))
            .await?;
        let validated = validate_journals_page(&document)?;
        let outcome = transform_page(&validated, &window, nominals);
        Ok((validated, outcome))
    }

    /// Fetches the trial balance as of `end` and the journals behind it.
    ///
    /// Journal lines are restricted to accounts present in the trial balance
    /// and grouped by account code.
    #[instrument(skip(self, tenant_id))]
    pub async fn fetch_ledger_snapshot(
        &self,
        tenant_id: &str,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    ) -> FetchResult<LedgerSnapshot> {
        let trial_balance = self
            .fetch_trial_balance(&TrialBalanceRequest::new(tenant_id, end))
            .await?;
        let fetched = self
            .fetch_journals(&JournalsRequest::new(tenant_id, start, end))
            .await?;

        let accounts: HashSet<&str> = trial_balance
            .rows
            .iter()
            .map(|row| row.account_code.as_str())
            .collect();
        let total_lines = fetched.lines.len();
        let journals: Vec<JournalLine> = fetched
            .lines
            .into_iter()
            .filter(|line| accounts.contains(line.account_code.as_str()))
            .collect();
        let journals_by_account = group_by_account(&journals);

        info!(
            accounts = trial_balance.rows.len(),
            journal_lines = total_lines,
            relevant_lines = journals.len(),
            "Ledger snapshot assembled"
        );
        Ok(LedgerSnapshot {
            trial_balance,
            journals,
            journals_by_account,
        })
    }

    /// Lists the tenants the access token can reach.
    #[instrument(skip(self))]
    pub async fn list_connections(&self) -> FetchResult<Vec<Connection>> {
        self.ensure_configured()?;
        let document = self.call("connections", || self.api.connections()).await?;
        Ok(validate_connections(&document)?)
    }
}
