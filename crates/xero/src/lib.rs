//! Accounting platform integration for Ledgerlink.
//!
//! This crate connects the pure logic in `ledgerlink-core` to the network:
//! - [`AccountingApi`], the seam towards the platform, with the reqwest
//!   implementation [`XeroHttpClient`]
//! - [`XeroFetcher`], which runs every network call through the retry
//!   executor, validates responses and normalizes them
//! - [`FetchError`], the error taxonomy surfaced to callers

pub mod api;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod request;

pub use api::{AccountingApi, JournalsQuery};
pub use error::{FetchError, FetchResult, TransportKind};
pub use fetcher::{FetchedJournals, JournalPage, LedgerSnapshot, XeroFetcher};
pub use http::XeroHttpClient;
pub use request::{JournalsRequest, TrialBalanceRequest};
