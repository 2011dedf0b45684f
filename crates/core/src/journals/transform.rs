//! Journal page transformation, filtering, ordering, and checks.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::types::{DateWindow, JournalLine, NominalFilter};
use crate::schema::{JournalEntry, JournalLineEntry, JournalsPage};
use crate::validation::ValidationError;

/// Lines produced from one page, with what was left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageOutcome {
    /// Emitted lines in response order.
    pub lines: Vec<JournalLine>,
    /// Counts of skipped journals and lines.
    pub stats: TransformStats,
}

/// Counts of journals and lines left out during transformation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformStats {
    /// Journals dated outside the requested window.
    pub journals_out_of_range: usize,
    /// Lines whose account is not in the nominal filter.
    pub lines_filtered: usize,
    /// Lines with a net amount of exactly zero.
    pub lines_zero_amount: usize,
}

impl TransformStats {
    /// Adds another page's counts to these.
    pub fn absorb(&mut self, other: Self) {
        self.journals_out_of_range += other.journals_out_of_range;
        self.lines_filtered += other.lines_filtered;
        self.lines_zero_amount += other.lines_zero_amount;
    }

    /// Total lines left out, not counting lines of out-of-range journals.
    #[must_use]
    pub const fn lines_skipped(&self) -> usize {
        self.lines_filtered + self.lines_zero_amount
    }
}

/// Flattens one validated page into journal lines.
///
/// Journals outside `window` are dropped whole. Within kept journals, lines
/// rejected by `nominals` and lines with a zero net amount are dropped.
#[must_use]
pub fn transform_page(
    page: &JournalsPage,
    window: &DateWindow,
    nominals: &NominalFilter,
) -> PageOutcome {
    let mut outcome = PageOutcome::default();

    for journal in &page.journals {
        if !window.contains(journal.journal_date) {
            outcome.stats.journals_out_of_range += 1;
            continue;
        }

        for line in &journal.lines {
            if !nominals.allows(&line.account_code) {
                outcome.stats.lines_filtered += 1;
                continue;
            }
            if line.net_amount.is_zero() {
                outcome.stats.lines_zero_amount += 1;
                continue;
            }
            outcome.lines.push(to_journal_line(journal, line));
        }
    }

    outcome
}

fn to_journal_line(journal: &JournalEntry, line: &JournalLineEntry) -> JournalLine {
    JournalLine {
        id: line.journal_line_id.clone(),
        date: journal.journal_date,
        journal_number: journal.journal_number.clone(),
        account_code: line.account_code.clone(),
        account_name: line.account_name.clone(),
        description: line.description.clone(),
        net: line.net_amount,
        tax: line.tax_amount,
        gross: line.gross_amount,
        source: journal.source_type.clone(),
        reference: journal.reference.clone(),
    }
}

/// Keeps only lines whose account passes `nominals`.
#[must_use]
pub fn filter_by_nominals(lines: Vec<JournalLine>, nominals: &NominalFilter) -> Vec<JournalLine> {
    if nominals.is_empty() {
        return lines;
    }
    lines
        .into_iter()
        .filter(|line| nominals.allows(&line.account_code))
        .collect()
}

/// Orders lines by posting date, keeping arrival order for equal dates.
#[must_use]
pub fn sort_journals_by_date(mut lines: Vec<JournalLine>) -> Vec<JournalLine> {
    lines.sort_by_key(|line| line.date);
    lines
}

/// Groups lines by account code, preserving line order within each group.
#[must_use]
pub fn group_by_account(lines: &[JournalLine]) -> BTreeMap<String, Vec<JournalLine>> {
    let mut groups: BTreeMap<String, Vec<JournalLine>> = BTreeMap::new();
    for line in lines {
        groups
            .entry(line.account_code.clone())
            .or_default()
            .push(line.clone());
    }
    groups
}

/// Checks that a journals result is non-empty, complete, and has unique IDs.
///
/// # Errors
///
/// - [`ValidationError::IncompleteData`] for an empty result
/// - [`ValidationError::MissingField`] for a line with a blank identifier,
///   account code, or account name
/// - [`ValidationError::DuplicateLineId`] for a repeated identifier
pub fn validate_journal_lines(lines: &[JournalLine]) -> Result<(), ValidationError> {
    if lines.is_empty() {
        return Err(ValidationError::IncompleteData("No journal data found".into()));
    }

    for (index, line) in lines.iter().enumerate() {
        let missing = if line.id.trim().is_empty() {
            Some("id")
        } else if line.account_code.trim().is_empty() {
            Some("account_code")
        } else if line.account_name.trim().is_empty() {
            Some("account_name")
        } else {
            None
        };
        if let Some(field) = missing {
            return Err(ValidationError::MissingField { index, field });
        }
    }

    let mut seen = HashSet::with_capacity(lines.len());
    for line in lines {
        if !seen.insert(line.id.as_str()) {
            return Err(ValidationError::DuplicateLineId(line.id.clone()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{RawDocument, validate_journals_page};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn january() -> DateWindow {
        DateWindow::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap()
    }

    fn sample_page() -> JournalsPage {
        let doc = RawDocument::new(json!({
            "Journals": [
                {
                    "JournalID": "j-1",
                    "JournalDate": "2024-01-10",
                    "JournalNumber": 1,
                    "Reference": "INV-001",
                    "SourceType": "ACCREC",
                    "JournalLines": [
                        {"JournalLineID": "l-1", "AccountCode": "200", "AccountName": "Sales",
                         "NetAmount": -100.0, "TaxAmount": -15.0, "GrossAmount": -115.0},
                        {"JournalLineID": "l-2", "AccountCode": "610", "AccountName": "Debtors",
                         "NetAmount": 115.0},
                        {"JournalLineID": "l-3", "AccountCode": "820", "AccountName": "GST",
                         "NetAmount": 0},
                    ]
                },
                {
                    "JournalID": "j-2",
                    "JournalDate": "2024-02-01",
                    "JournalLines": [
                        {"JournalLineID": "l-4", "AccountCode": "200", "AccountName": "Sales",
                         "NetAmount": -50.0},
                    ]
                }
            ]
        }));
        validate_journals_page(&doc).unwrap()
    }

    fn line(id: &str, code: &str, day: u32) -> JournalLine {
        JournalLine {
            id: id.into(),
            date: date(2024, 1, day),
            journal_number: None,
            account_code: code.into(),
            account_name: format!("Account {code}"),
            description: None,
            net: dec!(1),
            tax: None,
            gross: None,
            source: None,
            reference: None,
        }
    }

    #[test]
    fn test_transform_page() {
        let outcome = transform_page(&sample_page(), &january(), &NominalFilter::all());

        let ids: Vec<_> = outcome.lines.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["l-1", "l-2"]);
        assert_eq!(outcome.stats.journals_out_of_range, 1);
        assert_eq!(outcome.stats.lines_zero_amount, 1);
        assert_eq!(outcome.stats.lines_filtered, 0);

        let sales = &outcome.lines[0];
        assert_eq!(sales.date, date(2024, 1, 10));
        assert_eq!(sales.journal_number.as_deref(), Some("1"));
        assert_eq!(sales.net, dec!(-100));
        assert_eq!(sales.tax, Some(dec!(-15)));
        assert_eq!(sales.gross, Some(dec!(-115)));
        assert_eq!(sales.source.as_deref(), Some("ACCREC"));
        assert_eq!(sales.reference.as_deref(), Some("INV-001"));
    }

    #[test]
    fn test_transform_page_with_nominals() {
        let outcome = transform_page(&sample_page(), &january(), &NominalFilter::new(["610"]));
        assert_eq!(outcome.lines.len(), 1);
        assert_eq!(outcome.lines[0].account_code, "610");
        assert_eq!(outcome.stats.lines_filtered, 2);
        assert_eq!(outcome.stats.lines_skipped(), 2);
    }

    #[test]
    fn test_filter_and_sort() {
        let lines = vec![line("a", "260", 3), line("b", "200", 1), line("c", "200", 2)];
        let filtered = filter_by_nominals(lines, &NominalFilter::new(["200"]));
        assert!(filtered.iter().all(|l| l.account_code == "200"));

        let sorted = sort_journals_by_date(filtered);
        let days: Vec<_> = sorted.iter().map(|l| l.date).collect();
        assert_eq!(days, vec![date(2024, 1, 1), date(2024, 1, 2)]);
    }

    #[test]
    fn test_sort_orders_dates() {
        let sorted = sort_journals_by_date(vec![line("a", "1", 3), line("b", "1", 1), line("c", "1", 2)]);
        let days: Vec<_> = sorted.iter().map(|l| l.date).collect();
        assert_eq!(days, vec![date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3)]);
    }

    #[test]
    fn test_sort_is_stable() {
        let sorted = sort_journals_by_date(vec![
            line("late", "1", 5),
            line("first", "1", 2),
            line("second", "1", 2),
            line("third", "1", 2),
        ]);
        let ids: Vec<_> = sorted.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third", "late"]);
    }

    #[test]
    fn test_filter_empty_is_noop() {
        let lines = vec![line("a", "260", 3), line("b", "200", 1)];
        assert_eq!(filter_by_nominals(lines.clone(), &NominalFilter::all()), lines);
    }

    #[test]
    fn test_group_by_account() {
        let groups = group_by_account(&[line("a", "200", 1), line("b", "610", 1), line("c", "200", 2)]);
        assert_eq!(groups.len(), 2);
        let ids: Vec<_> = groups["200"].iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_validate_ok() {
        assert!(validate_journal_lines(&[line("a", "200", 1), line("b", "200", 1)]).is_ok());
    }

    #[test]
    fn test_validate_empty() {
        assert!(matches!(
            validate_journal_lines(&[]),
            Err(ValidationError::IncompleteData(_))
        ));
    }

    #[test]
    fn test_validate_missing_field() {
        let mut bad = line("b", "200", 1);
        bad.account_name = String::new();
        assert_eq!(
            validate_journal_lines(&[line("a", "200", 1), bad]),
            Err(ValidationError::MissingField {
                index: 1,
                field: "account_name"
            })
        );

        assert_eq!(
            validate_journal_lines(&[line("", "200", 1)]),
            Err(ValidationError::MissingField { index: 0, field: "id" })
        );
    }

    #[test]
    fn test_validate_duplicate_ids() {
        assert_eq!(
            validate_journal_lines(&[line("a", "200", 1), line("b", "200", 1), line("a", "610", 2)]),
            Err(ValidationError::DuplicateLineId("a".into()))
        );
    }
}
