//! Trial balance flattening and consistency checks.

use std::collections::HashSet;
use std::str::FromStr;

use rust_decimal::Decimal;

use super::types::{FlattenedTrialBalance, TrialBalanceRow};
use crate::schema::{ReportRow, RowType, TrialBalanceReport};
use crate::validation::ValidationError;

/// Minimum number of cells an account row needs: code, name, opening, movement.
const MIN_ACCOUNT_CELLS: usize = 4;

/// Service for turning trial balance reports into account rows.
pub struct TrialBalanceService;

impl TrialBalanceService {
    /// Flattens a report into account rows.
    ///
    /// Header rows are skipped. Each `Row` nested inside a `Section` with at
    /// least four cells becomes one account row, reading code, name, opening,
    /// movement, and (when present) closing from cells 0 to 4.
    #[must_use]
    pub fn flatten(report: &TrialBalanceReport) -> FlattenedTrialBalance {
        let mut flattened = FlattenedTrialBalance::default();

        for row in &report.rows {
            match row.row_type {
                RowType::Header => {}
                RowType::Section => {
                    for account_row in row.rows.iter().filter(|r| r.row_type == RowType::Row) {
                        match Self::account_row(account_row) {
                            Some(tb_row) => flattened.rows.push(tb_row),
                            None => flattened.skipped += 1,
                        }
                    }
                }
                _ => {}
            }
        }

        flattened
    }

    fn account_row(row: &ReportRow) -> Option<TrialBalanceRow> {
        let cells = &row.cells;
        if cells.len() < MIN_ACCOUNT_CELLS {
            return None;
        }

        let account_code = cells[0].text().trim();
        let account_name = cells[1].text().trim();
        if account_code.is_empty() && account_name.is_empty() {
            return None;
        }

        let opening = parse_amount(cells[2].text());
        let movement = parse_amount(cells[3].text());
        let closing = cells.get(4).map_or(Decimal::ZERO, |c| parse_amount(c.text()));

        Some(TrialBalanceRow {
            account_code: account_code.to_string(),
            account_name: account_name.to_string(),
            opening: non_zero(opening),
            movement: non_zero(movement),
            closing,
            is_debit: closing > Decimal::ZERO,
        })
    }
}

fn non_zero(value: Decimal) -> Option<Decimal> {
    (!value.is_zero()).then_some(value)
}

/// Parses a display amount such as `"1,500.00"` or `"-250.10"`.
///
/// Everything except digits, the decimal point, and a leading minus sign is
/// discarded. Text that still does not parse yields zero.
///
/// Stray characters are dropped rather than ending the number, so `"5-3"`
/// reads as 53 and `"--5"` as -5. A second decimal point makes the whole
/// text unparseable, so `"1.2.3"` is zero rather than 1.2.
#[must_use]
pub fn parse_amount(text: &str) -> Decimal {
    let mut cleaned = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_digit() || c == '.' || (c == '-' && cleaned.is_empty()) {
            cleaned.push(c);
        }
    }
    Decimal::from_str(&cleaned).unwrap_or(Decimal::ZERO)
}

/// Checks that a flattened trial balance is complete and has unique codes.
///
/// # Errors
///
/// - [`ValidationError::IncompleteData`] for an empty result or a row with a
///   blank account code or name
/// - [`ValidationError::DuplicateAccountCode`] for a repeated code
pub fn validate_trial_balance_rows(rows: &[TrialBalanceRow]) -> Result<(), ValidationError> {
    if rows.is_empty() {
        return Err(ValidationError::IncompleteData(
            "No trial balance data found".into(),
        ));
    }

    for row in rows {
        if row.account_code.trim().is_empty() {
            return Err(ValidationError::IncompleteData(
                "Account code is required for all trial balance rows".into(),
            ));
        }
        if row.account_name.trim().is_empty() {
            return Err(ValidationError::IncompleteData(
                "Account name is required for all trial balance rows".into(),
            ));
        }
    }

    let mut seen = HashSet::with_capacity(rows.len());
    for row in rows {
        if !seen.insert(row.account_code.as_str()) {
            return Err(ValidationError::DuplicateAccountCode(
                row.account_code.clone(),
            ));
        }
    }

    Ok(())
}
