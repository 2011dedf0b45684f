//! Structural validation of raw accounting API documents.
//!
//! Responses arrive as [`RawDocument`]s, an opaque wrapper around untyped
//! JSON that only this module can look inside. The validators walk the
//! document, check every required field and the type of every optional one,
//! and return strongly typed values. The first violation is reported with the
//! path of the offending field, e.g. `Reports[0].Rows[3].Cells[1].Value`.

pub mod connections;
mod dates;
mod document;
pub mod error;
pub mod journals;
pub mod report;

pub use connections::{Connection, validate_connections};
pub use dates::parse_api_date;
pub use document::RawDocument;
pub use error::{SchemaError, SchemaResult};
pub use journals::{
    JournalEntry, JournalLineEntry, JournalsPage, Pagination, TrackingCategory,
    validate_journals_page,
};
pub use report::{
    CellAttribute, ReportCell, ReportRow, RowType, TrialBalanceReport, validate_trial_balance,
};
