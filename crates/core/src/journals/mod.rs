//! Journal line normalization.
//!
//! This module provides the pure half of a journals fetch:
//! - Per-page transformation from validated journals into flat lines
//! - Nominal (account code) filtering and stable date ordering
//! - The continuation decision between pages
//! - Consistency checks and grouping of a finished result

pub mod pagination;
pub mod transform;
pub mod types;

#[cfg(test)]
mod transform_props;

pub use pagination::{Continuation, MAX_OFFSET, next_request};
pub use transform::{
    PageOutcome, TransformStats, filter_by_nominals, group_by_account, sort_journals_by_date,
    transform_page, validate_journal_lines,
};
pub use types::{DateWindow, JournalLine, NominalFilter};
