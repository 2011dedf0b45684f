//! Shared configuration and types for Ledgerlink.
//!
//! This crate provides the pieces every other crate agrees on:
//! - Configuration management (accounting API credentials, retry and
//!   pagination settings)
//! - The credential precondition check performed before any network call
//! - Pagination request types for offset-based listing endpoints

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, Credentials, JournalSettings, RetrySettings, XeroConfig};
pub use error::{ConfigError, ConfigResult};
