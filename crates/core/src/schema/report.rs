//! Trial balance report schema.
//!
//! Wire shape:
//!
//! ```text
//! { "Reports": [ {
//!     "ReportID", "ReportName", "ReportDate", "UpdatedDateUTC",
//!     "Rows": [ { "RowType", "Title"?, "Cells"?: [ { "Value"?, "Attributes"?: [ { "Value", "Id"? } ] } ],
//!                 "Rows"?: [ { "RowType", "Cells": [...] } ] } ]
//! } ] }
//! ```

use serde::{Deserialize, Serialize};

use super::document::{Node, RawDocument};
use super::error::SchemaResult;

/// A validated trial balance report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceReport {
    /// Report identifier.
    pub report_id: String,
    /// Report name.
    pub report_name: String,
    /// Human-readable report date.
    pub report_date: String,
    /// Last update timestamp as sent by the API.
    pub updated_date_utc: String,
    /// Top-level rows in display order.
    pub rows: Vec<ReportRow>,
}

/// Kind of a report row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowType {
    /// Column headings.
    Header,
    /// Group of account rows.
    Section,
    /// A single account.
    Row,
    /// Section or report totals.
    SummaryRow,
    /// Any row type this crate does not know.
    Other(String),
}

impl From<&str> for RowType {
    fn from(raw: &str) -> Self {
        match raw {
            "Header" => Self::Header,
            "Section" => Self::Section,
            "Row" => Self::Row,
            "SummaryRow" => Self::SummaryRow,
            other => Self::Other(other.to_string()),
        }
    }
}

/// One row of a report.
///
/// Only top-level rows carry nested `rows`; the report is two levels deep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    /// Row kind.
    pub row_type: RowType,
    /// Section title, if any.
    pub title: Option<String>,
    /// Display cells in column order.
    pub cells: Vec<ReportCell>,
    /// Nested rows of a section.
    pub rows: Vec<ReportRow>,
}

/// One display cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportCell {
    /// Display text.
    pub value: Option<String>,
    /// Attributes such as the account identifier.
    pub attributes: Vec<CellAttribute>,
}

/// Cell attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellAttribute {
    /// Attribute name.
    pub id: Option<String>,
    /// Attribute value.
    pub value: String,
}

impl ReportCell {
    /// Returns the display text, or an empty string when absent.
    #[must_use]
    pub fn text(&self) -> &str {
        self.value.as_deref().unwrap_or_default()
    }
}

/// Validates a trial balance response and returns its first report.
pub fn validate_trial_balance(document: &RawDocument) -> SchemaResult<TrialBalanceReport> {
    let root = document.root();
    let reports = root.required_array("Reports")?;
    let Some(report) = reports.first() else {
        return Err(root.required("Reports")?.invalid("expected at least one report"));
    };
    decode_report(report)
}

fn decode_report(node: &Node<'_>) -> SchemaResult<TrialBalanceReport> {
    let rows = node
        .required_array("Rows")?
        .iter()
        .map(decode_top_level_row)
        .collect::<SchemaResult<Vec<_>>>()?;

    Ok(TrialBalanceReport {
        report_id: node.required_str("ReportID")?,
        report_name: node.required_str("ReportName")?,
        report_date: node.required_str("ReportDate")?,
        updated_date_utc: node.required_str("UpdatedDateUTC")?,
        rows,
    })
}

fn decode_top_level_row(node: &Node<'_>) -> SchemaResult<ReportRow> {
    let cells = node
        .optional_array("Cells")?
        .iter()
        .map(decode_cell)
        .collect::<SchemaResult<Vec<_>>>()?;
    let rows = node
        .optional_array("Rows")?
        .iter()
        .map(decode_nested_row)
        .collect::<SchemaResult<Vec<_>>>()?;

    Ok(ReportRow {
        row_type: RowType::from(node.required_str("RowType")?.as_str()),
        title: node.optional_str("Title")?,
        cells,
        rows,
    })
}

fn decode_nested_row(node: &Node<'_>) -> SchemaResult<ReportRow> {
    let cells = node
        .required_array("Cells")?
        .iter()
        .map(decode_cell)
        .collect::<SchemaResult<Vec<_>>>()?;

    Ok(ReportRow {
        row_type: RowType::from(node.required_str("RowType")?.as_str()),
        title: node.optional_str("Title")?,
        cells,
        rows: Vec::new(),
    })
}

fn decode_cell(node: &Node<'_>) -> SchemaResult<ReportCell> {
    let attributes = node
        .optional_array("Attributes")?
        .iter()
        .map(|attr| {
            Ok(CellAttribute {
                id: attr.optional_str("Id")?,
                value: attr.required_str("Value")?,
            })
        })
        .collect::<SchemaResult<Vec<_>>>()?;

    Ok(ReportCell {
        value: node.optional_str("Value")?,
        attributes,
    })
}
