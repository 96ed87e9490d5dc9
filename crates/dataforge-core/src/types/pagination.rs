//! Pagination types for list queries.

use serde::{Deserialize, Serialize};

/// A normalized page descriptor.
///
/// Only the three request-side fields are stored; `skip` and `total_pages`
/// are always derived from them so the invariants cannot drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Requested page number (1-based, clamped to ≥ 1).
    pub current_page: u64,
    /// Requested page size (clamped to ≥ 1).
    pub page_size: u64,
    /// Total number of rows matching the query before paging.
    pub total_count: u64,
}

impl Page {
    /// Build a page descriptor, clamping the page number and size to ≥ 1.
    pub fn new(current_page: u64, page_size: u64, total_count: u64) -> Self {
        Self {
            current_page: current_page.max(1),
            page_size: page_size.max(1),
            total_count,
        }
    }

    /// Number of rows to skip before the first row of this page.
    pub fn skip(&self) -> u64 {
        (self.current_page - 1) * self.page_size
    }

    /// Total number of pages; zero when no rows match.
    pub fn total_pages(&self) -> u64 {
        self.total_count.div_ceil(self.page_size)
    }

    /// Whether a page follows this one.
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages()
    }

    /// Whether a page precedes this one.
    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }
}

/// An immutable pairing of one page of data with its descriptor.
///
/// Constructed once per query and never mutated; `items.len()` is at most
/// `page.page_size` (fewer on the last page, zero past the end).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedResult<T> {
    /// The rows on this page, in query order.
    pub items: Vec<T>,
    /// The descriptor the rows were fetched under.
    pub page: Page,
}

impl<T> PagedResult<T> {
    /// Pair a fetched data page with its descriptor.
    pub fn new(items: Vec<T>, page: Page) -> Self {
        Self { items, page }
    }

    /// An empty result for the given descriptor.
    pub fn empty(page: Page) -> Self {
        Self {
            items: Vec::new(),
            page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_and_total_pages() {
        let page = Page::new(3, 10, 23);
        assert_eq!(page.skip(), 20);
        assert_eq!(page.total_pages(), 3);
    }

    #[test]
    fn test_clamps_zero_inputs() {
        let page = Page::new(0, 0, 5);
        assert_eq!(page.current_page, 1);
        assert_eq!(page.page_size, 1);
        assert_eq!(page.skip(), 0);
    }

    #[test]
    fn test_empty_result_set_has_zero_pages() {
        let page = Page::new(1, 10, 0);
        assert_eq!(page.total_pages(), 0);
        assert!(!page.has_next());
    }

    #[test]
    fn test_exact_multiple_of_page_size() {
        let page = Page::new(2, 10, 30);
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next());
        assert!(page.has_previous());
    }

    #[test]
    fn test_page_past_the_end_keeps_true_totals() {
        let page = Page::new(9, 10, 23);
        assert_eq!(page.skip(), 80);
        assert_eq!(page.total_pages(), 3);
        assert!(!page.has_next());
    }
}
