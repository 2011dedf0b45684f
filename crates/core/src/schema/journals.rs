//! Journals page schema.
//!
//! Wire shape:
//!
//! ```text
//! { "Journals": [ {
//!     "JournalID", "JournalDate", "JournalNumber"?, "Reference"?, "SourceID"?, "SourceType"?,
//!     "CreatedDateUTC"?,
//!     "JournalLines": [ { "JournalLineID", "AccountID"?, "AccountCode", "AccountType"?,
//!                         "AccountName", "Description"?, "NetAmount", "GrossAmount"?,
//!                         "TaxAmount"?, "TaxType"?, "TaxName"?, "TrackingCategories"?: [...] } ]
//!   } ],
//!   "pagination"?: { "page", "pageSize"?, "pageCount", "itemCount" } }
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::document::{Node, RawDocument};
use super::error::SchemaResult;

/// A validated page of journals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalsPage {
    /// Journals in response order.
    pub journals: Vec<JournalEntry>,
    /// Pagination descriptor, when the API sent one.
    pub pagination: Option<Pagination>,
}

/// Pagination descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Current page, one-indexed.
    pub page: u32,
    /// Page size the server applied.
    pub page_size: Option<u32>,
    /// Total number of pages.
    pub page_count: u32,
    /// Total number of items across pages.
    pub item_count: u64,
}

/// A posted journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Journal identifier.
    pub journal_id: String,
    /// Posting date.
    pub journal_date: NaiveDate,
    /// Sequential journal number.
    pub journal_number: Option<String>,
    /// Reference text.
    pub reference: Option<String>,
    /// Identifier of the source document.
    pub source_id: Option<String>,
    /// Kind of source document (ACCREC, ACCPAY, MANJOURNAL, ...).
    pub source_type: Option<String>,
    /// Creation timestamp as sent by the API.
    pub created_date_utc: Option<String>,
    /// Lines in response order.
    pub lines: Vec<JournalLineEntry>,
}

/// One line of a posted journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLineEntry {
    /// Line identifier.
    pub journal_line_id: String,
    /// Account identifier.
    pub account_id: Option<String>,
    /// Account code.
    pub account_code: String,
    /// Account type.
    pub account_type: Option<String>,
    /// Account name.
    pub account_name: String,
    /// Line description.
    pub description: Option<String>,
    /// Net amount.
    pub net_amount: Decimal,
    /// Gross amount.
    pub gross_amount: Option<Decimal>,
    /// Tax amount.
    pub tax_amount: Option<Decimal>,
    /// Tax type code.
    pub tax_type: Option<String>,
    /// Tax rate name.
    pub tax_name: Option<String>,
    /// Tracking category assignments.
    pub tracking: Vec<TrackingCategory>,
}

/// Tracking category assignment on a journal line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingCategory {
    /// Tracking category identifier.
    pub tracking_category_id: String,
    /// Tracking option identifier.
    pub tracking_option_id: Option<String>,
    /// Category name.
    pub name: String,
    /// Selected option.
    pub option: String,
}

/// Validates a journals listing response.
pub fn validate_journals_page(document: &RawDocument) -> SchemaResult<JournalsPage> {
    let root = document.root();
    let journals = root
        .required_array("Journals")?
        .iter()
        .map(decode_journal)
        .collect::<SchemaResult<Vec<_>>>()?;
    let pagination = root
        .get("pagination")?
        .map(|node| decode_pagination(&node))
        .transpose()?;

    Ok(JournalsPage {
        journals,
        pagination,
    })
}

fn decode_pagination(node: &Node<'_>) -> SchemaResult<Pagination> {
    Ok(Pagination {
        page: node.required_u32("page")?,
        page_size: node.optional_u32("pageSize")?,
        page_count: node.required_u32("pageCount")?,
        item_count: node.required_u64("itemCount")?,
    })
}

fn decode_journal(node: &Node<'_>) -> SchemaResult<JournalEntry> {
    Ok(JournalEntry {
        journal_id: node.required_str("JournalID")?,
        journal_date: node.required_date("JournalDate")?,
        journal_number: node.optional_str_or_int("JournalNumber")?,
        reference: node.optional_str("Reference")?,
        source_id: node.optional_str("SourceID")?,
        source_type: node.optional_str("SourceType")?,
        created_date_utc: node.optional_str("CreatedDateUTC")?,
        lines: node
            .required_array("JournalLines")?
            .iter()
            .map(decode_line)
            .collect::<SchemaResult<Vec<_>>>()?,
    })
}

fn decode_line(node: &Node<'_>) -> SchemaResult<JournalLineEntry> {
    Ok(JournalLineEntry {
        journal_line_id: node.required_str("JournalLineID")?,
        account_id: node.optional_str("AccountID")?,
        account_code: node.required_str("AccountCode")?,
        account_type: node.optional_str("AccountType")?,
        account_name: node.required_str("AccountName")?,
        description: node.optional_str("Description")?,
        net_amount: node.required_decimal("NetAmount")?,
        gross_amount: node.optional_decimal("GrossAmount")?,
        tax_amount: node.optional_decimal("TaxAmount")?,
        tax_type: node.optional_str("TaxType")?,
        tax_name: node.optional_str("TaxName")?,
        tracking: node
            .optional_array("TrackingCategories")?
            .iter()
            .map(|t| {
                Ok(TrackingCategory {
                    tracking_category_id: t.required_str("TrackingCategoryID")?,
                    tracking_option_id: t.optional_str("TrackingOptionID")?,
                    name: t.required_str("Name")?,
                    option: t.required_str("Option")?,
                })
            })
            .collect::<SchemaResult<Vec<_>>>()?,
    })
}
