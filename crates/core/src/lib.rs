//! Core retrieval logic for Ledgerlink.
//!
//! This crate contains the network-free half of the accounting data pipeline.
//! Everything that talks HTTP lives in `ledgerlink-xero`; everything that
//! decides what to retry, what a response must look like, and how hierarchical
//! reports become flat rows lives here.
//!
//! # Modules
//!
//! - `retry` - Bounded retries with exponential backoff and jitter
//! - `schema` - Structural validation of raw API documents
//! - `trial_balance` - Flattening of trial balance reports into account rows
//! - `journals` - Journal line transformation, filtering, sorting, and paging
//! - `validation` - Post-fetch consistency checks

pub mod journals;
pub mod retry;
pub mod schema;
pub mod trial_balance;
pub mod validation;
