//! Trial balance row types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One ledger account's balances as of the report date.
///
/// `opening` and `movement` are `None` both when the report left the cell
/// blank and when it showed exactly zero. Callers that need to tell the two
/// apart must read the report itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    /// Account code, trimmed.
    pub account_code: String,
    /// Account name, trimmed.
    pub account_name: String,
    /// Opening balance, when non-zero.
    pub opening: Option<Decimal>,
    /// Movement over the period, when non-zero.
    pub movement: Option<Decimal>,
    /// Closing balance.
    pub closing: Decimal,
    /// Whether the closing balance is positive.
    pub is_debit: bool,
}

/// Rows produced from one report, plus the account rows that were dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlattenedTrialBalance {
    /// Account rows in report order.
    pub rows: Vec<TrialBalanceRow>,
    /// Account rows skipped for too few cells or a blank code and name.
    pub skipped: usize,
}
