//! Trial balance normalization.
//!
//! Turns a validated two-level trial balance report into one flat row per
//! ledger account, and checks a flattened result for consistency.

pub mod service;
pub mod types;


pub use service::{TrialBalanceService, parse_amount, validate_trial_balance_rows};
pub use types::{FlattenedTrialBalance, TrialBalanceRow};
