//! Deciding whether another journals page is needed.

use ledgerlink_shared::types::PageRequest;

use crate::schema::Pagination;

/// Offset above which paging stops.
pub const MAX_OFFSET: u64 = 10_000;

/// What to do after a page has been transformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// Fetch this page next.
    Fetch(PageRequest),
    /// The listing is exhausted.
    Done,
    /// The next offset is past the ceiling; the result is truncated.
    OffsetCeiling {
        /// Offset that would have been requested.
        offset: u64,
    },
    /// The server reported a page that would not move the offset forward.
    Stalled {
        /// Offset of the page just fetched.
        offset: u64,
    },
}

/// Computes the request following `current`.
///
/// With a pagination descriptor, paging continues while `page < page_count`
/// and the next offset is `page * page_size`. Without one, paging continues
/// while the page yielded exactly `page_size` lines and the offset advances
/// by `page_size`. A continuing request whose offset exceeds `max_offset`
/// becomes [`Continuation::OffsetCeiling`].
#[must_use]
pub fn next_request(
    current: PageRequest,
    pagination: Option<&Pagination>,
    lines_on_page: usize,
    max_offset: u64,
) -> Continuation {
    let next = match pagination {
        Some(descriptor) => {
            if descriptor.page >= descriptor.page_count {
                return Continuation::Done;
            }
            current.after_page(descriptor.page)
        }
        None => {
            let full_page = usize::try_from(current.page_size).is_ok_and(|size| size == lines_on_page);
            if !full_page || current.page_size == 0 {
                return Continuation::Done;
            }
            current.next()
        }
    };

    if next.offset <= current.offset {
        return Continuation::Stalled {
            offset: current.offset,
        };
    }
    if next.offset > max_offset {
        return Continuation::OffsetCeiling {
            offset: next.offset,
        };
    }
    Continuation::Fetch(next)
}
