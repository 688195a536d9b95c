//! Page-number pagination for the public post list.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Number of posts shown on one page of the post list.
pub const POSTS_PER_PAGE: u64 = 5;

/// Page metadata derived from a total item count and a requested page.
///
/// `next_page` and `prev_page` use `0` to mean "no such page".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_posts: u64,
    pub has_next: bool,
    pub has_prev: bool,
    pub next_page: u64,
    pub prev_page: u64,
}

impl PaginationInfo {
    /// Compute pagination for `total_posts` items, clamping `requested_page`
    /// into `[1, max(total_pages, 1)]`.
    pub fn new(total_posts: u64, requested_page: i64) -> Self {
        let total_pages = total_posts.div_ceil(POSTS_PER_PAGE);

        let requested = u64::try_from(requested_page).unwrap_or(0).max(1);
        let current_page = if total_pages == 0 {
            1
        } else {
            requested.min(total_pages)
        };

        let has_next = current_page < total_pages;
        let has_prev = current_page > 1;

        Self {
            current_page,
            total_pages,
            total_posts,
            has_next,
            has_prev,
            next_page: if has_next { current_page + 1 } else { 0 },
            prev_page: if has_prev { current_page - 1 } else { 0 },
        }
    }

    /// Number of items to skip before the current page.
    pub fn offset(&self) -> u64 {
        self.current_page.saturating_sub(1) * POSTS_PER_PAGE
    }

    /// Index range of the current page within an ordered sequence of `len` items.
    pub fn window(&self, len: usize) -> Range<usize> {
        let start = usize::try_from(self.offset()).map_or(len, |offset| offset.min(len));
        let end = start.saturating_add(POSTS_PER_PAGE as usize).min(len);
        start..end
    }
}
