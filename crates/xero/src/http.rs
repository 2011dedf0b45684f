//! reqwest implementation of [`AccountingApi`].

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use ledgerlink_core::schema::RawDocument;
use ledgerlink_shared::XeroConfig;
use reqwest::header::{ACCEPT, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};

use crate::api::{AccountingApi, JournalsQuery};
use crate::error::{FetchError, FetchResult};

const TRIAL_BALANCE_PATH: &str = "/api.xro/2.0/Reports/TrialBalance";
const JOURNALS_PATH: &str = "/api.xro/2.0/Journals";
const CONNECTIONS_PATH: &str = "/connections";
const TENANT_HEADER: &str = "Xero-tenant-id";

/// Longest error body kept in an [`FetchError::Http`] message.
const MAX_ERROR_BODY: usize = 512;

/// HTTP client for the accounting platform.
#[derive(Clone)]
pub struct XeroHttpClient {
    http: Client,
    base_url: String,
    access_token: String,
}

impl std::fmt::Debug for XeroHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XeroHttpClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl XeroHttpClient {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::NotConfigured`] without an access token, or
    /// [`FetchError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: &XeroConfig) -> FetchResult<Self> {
        let access_token = config.bearer_token()?;
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            access_token,
        })
    }

    /// Returns the base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(
        &self,
        path: &str,
        tenant_id: Option<&str>,
        query: &[(&str, String)],
    ) -> FetchResult<Option<RawDocument>> {
        let mut request = self
            .http
            .get(format!("{}{path}", self.base_url))
            .bearer_auth(&self.access_token)
            .header(ACCEPT, "application/json")
            .query(query);
        if let Some(tenant_id) = tenant_id {
            request = request.header(TENANT_HEADER, tenant_id);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(path, status = status.as_u16(), "Accounting API responded");

        if !status.is_success() {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Http {
                status: status.as_u16(),
                message: error_message(status, &body),
                retry_after_secs,
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let body = response.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(Some(RawDocument::from_slice(&body)?))
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Unknown status")
            .to_string();
    }
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

#[async_trait]
impl AccountingApi for XeroHttpClient {
    #[instrument(skip(self), fields(endpoint = "trial_balance"))]
    async fn trial_balance(
        &self,
        tenant_id: &str,
        date: NaiveDate,
    ) -> FetchResult<Option<RawDocument>> {
        let query = [("date", date.format("%Y-%m-%d").to_string())];
        self.get(TRIAL_BALANCE_PATH, Some(tenant_id), &query).await
    }

    #[instrument(skip(self, query), fields(endpoint = "journals", offset = query.page.offset))]
    async fn journals(
        &self,
        tenant_id: &str,
        query: &JournalsQuery,
    ) -> FetchResult<Option<RawDocument>> {
        self.get(JOURNALS_PATH, Some(tenant_id), &query.query_pairs())
            .await
    }

    #[instrument(skip(self), fields(endpoint = "connections"))]
    async fn connections(&self) -> FetchResult<Option<RawDocument>> {
        self.get(CONNECTIONS_PATH, None, &[]).await
    }
}
