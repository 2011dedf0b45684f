//! Property-based tests for journal transformation.

use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use serde_json::{Value, json};

use super::transform::{filter_by_nominals, sort_journals_by_date, transform_page};
use super::types::{DateWindow, NominalFilter};
use crate::schema::{RawDocument, validate_journals_page};

const CODES: [&str; 4] = ["200", "400", "610", "820"];

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn amount(cents: i64) -> Value {
    serde_json::from_str(&Decimal::new(cents, 2).to_string()).unwrap()
}

fn page_json(journals: &[(u64, Vec<(usize, i64)>)]) -> Value {
    let journals: Vec<Value> = journals
        .iter()
        .enumerate()
        .map(|(j, (day, lines))| {
            let lines: Vec<Value> = lines
                .iter()
                .enumerate()
                .map(|(l, (code, cents))| {
                    json!({
                        "JournalLineID": format!("{j}-{l}"),
                        "AccountCode": CODES[*code],
                        "AccountName": format!("Account {}", CODES[*code]),
                        "NetAmount": amount(*cents),
                    })
                })
                .collect();
            let date = base_date() + Days::new(*day);
            json!({
                "JournalID": format!("j-{j}"),
                "JournalDate": date.format("%Y-%m-%d").to_string(),
                "JournalLines": lines,
            })
        })
        .collect();
    json!({ "Journals": journals })
}

fn journals_strategy() -> impl Strategy<Value = Vec<(u64, Vec<(usize, i64)>)>> {
    prop::collection::vec(
        (
            0u64..60,
            prop::collection::vec((0usize..CODES.len(), -500i64..500), 0..6),
        ),
        0..12,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// No emitted line has a zero net amount or a date outside the window.
    #[test]
    fn prop_no_zero_or_out_of_range_lines(journals in journals_strategy()) {
        let page = validate_journals_page(&RawDocument::new(page_json(&journals))).unwrap();
        let window = DateWindow::new(base_date(), base_date() + Days::new(30)).unwrap();

        let outcome = transform_page(&page, &window, &NominalFilter::all());

        for line in &outcome.lines {
            prop_assert!(!line.net.is_zero());
            prop_assert!(window.contains(line.date));
        }
    }

    /// With a nominal filter, every emitted line belongs to a listed account.
    #[test]
    fn prop_nominal_filter_membership(
        journals in journals_strategy(),
        picks in prop::collection::hash_set(0usize..CODES.len(), 1..CODES.len()),
    ) {
        let allowed: Vec<&str> = picks.iter().map(|&i| CODES[i]).collect();
        let filter = NominalFilter::new(allowed.iter().copied());
        let page = validate_journals_page(&RawDocument::new(page_json(&journals))).unwrap();
        let window = DateWindow::new(base_date(), base_date() + Days::new(60)).unwrap();

        let outcome = transform_page(&page, &window, &filter);
        for line in &outcome.lines {
            prop_assert!(allowed.contains(&line.account_code.as_str()));
        }

        let refiltered = filter_by_nominals(outcome.lines.clone(), &filter);
        prop_assert_eq!(refiltered, outcome.lines);
    }

    /// Sorting yields non-decreasing dates and keeps every line.
    #[test]
    fn prop_sorted_by_date(journals in journals_strategy()) {
        let page = validate_journals_page(&RawDocument::new(page_json(&journals))).unwrap();
        let window = DateWindow::new(base_date(), base_date() + Days::new(60)).unwrap();
        let lines = transform_page(&page, &window, &NominalFilter::all()).lines;
        let count = lines.len();

        let sorted = sort_journals_by_date(lines);
        prop_assert_eq!(sorted.len(), count);
        prop_assert!(sorted.windows(2).all(|pair| pair[0].date <= pair[1].date));
    }
}
