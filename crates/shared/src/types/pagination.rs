//! Offset-based pagination for listing endpoints.

use serde::{Deserialize, Serialize};

/// Position and size of one page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Number of items skipped before this page.
    #[serde(default)]
    pub offset: u64,
    /// Number of items per page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page_size() -> u32 {
    100
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            offset: 0,
            page_size: default_page_size(),
        }
    }
}

impl PageRequest {
    /// Creates a page request at the given offset.
    #[must_use]
    pub const fn new(offset: u64, page_size: u32) -> Self {
        Self { offset, page_size }
    }

    /// Creates the request for a zero-indexed page number.
    #[must_use]
    pub const fn for_page(page: u32, page_size: u32) -> Self {
        Self {
            offset: page as u64 * page_size as u64,
            page_size,
        }
    }

    /// Returns the request immediately following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self {
            offset: self.offset.saturating_add(self.page_size as u64),
            page_size: self.page_size,
        }
    }

    /// Returns the request that follows a server-reported page number.
    ///
    /// Servers report one-indexed page numbers, so page `n` having been
    /// served means the next offset is `n * page_size`.
    #[must_use]
    pub const fn after_page(self, current_page: u32) -> Self {
        Self::for_page(current_page, self.page_size)
    }
}
