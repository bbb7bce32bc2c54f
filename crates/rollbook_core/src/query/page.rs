//! Page arithmetic for the record table.
//!
//! # Invariants
//! - `page_size` is always positive.
//! - `total_pages >= 1`, even for an empty result.
//! - Page numbers are clamped into `[1, total_pages]`, never rejected.

use std::ops::Range;

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Current page position over a derived result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpec {
    page_number: usize,
    page_size: usize,
}

impl Default for PageSpec {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl PageSpec {
    /// Creates a spec on page 1. A zero `page_size` is raised to 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_number: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn page_number(&self) -> usize {
        self.page_number
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of pages needed for `item_count` items.
    pub fn total_pages(&self, item_count: usize) -> usize {
        item_count.div_ceil(self.page_size).max(1)
    }

    /// Moves to `page_number`, clamped for `item_count` items.
    ///
    /// Returns whether the page number changed.
    pub fn go_to(&mut self, page_number: usize, item_count: usize) -> bool {
        let clamped = page_number.clamp(1, self.total_pages(item_count));
        let changed = clamped != self.page_number;
        self.page_number = clamped;
        changed
    }

    /// Re-clamps the current page after the item count changed.
    pub fn clamp_to(&mut self, item_count: usize) {
        self.go_to(self.page_number, item_count);
    }

    pub fn reset(&mut self) {
        self.page_number = 1;
    }

    /// Index range of the current page within `item_count` items.
    pub fn range(&self, item_count: usize) -> Range<usize> {
        let start = (self.page_number - 1)
            .saturating_mul(self.page_size)
            .min(item_count);
        let end = start.saturating_add(self.page_size).min(item_count);
        start..end
    }

    /// Zero-based offset of the first row on the current page.
    pub fn offset(&self) -> usize {
        (self.page_number - 1) * self.page_size
    }
}

#[cfg(test)]
mod tests {
    use super::PageSpec;

    #[test]
    fn total_pages_is_at_least_one() {
        let spec = PageSpec::new(10);
        assert_eq!(spec.total_pages(0), 1);
        assert_eq!(spec.total_pages(10), 1);
        assert_eq!(spec.total_pages(11), 2);
        assert_eq!(spec.total_pages(25), 3);
    }

    #[test]
    fn go_to_clamps_into_range() {
        let mut spec = PageSpec::new(10);
        assert!(spec.go_to(5, 25));
        assert_eq!(spec.page_number(), 3);
        assert!(spec.go_to(0, 25));
        assert_eq!(spec.page_number(), 1);
        assert!(!spec.go_to(1, 25));
    }

    #[test]
    fn range_covers_partial_last_page() {
        let mut spec = PageSpec::new(10);
        spec.go_to(3, 25);
        assert_eq!(spec.range(25), 20..25);
        assert_eq!(spec.offset(), 20);
    }

    #[test]
    fn clamp_to_follows_shrinking_results() {
        let mut spec = PageSpec::new(10);
        spec.go_to(3, 25);
        spec.clamp_to(12);
        assert_eq!(spec.page_number(), 2);
        assert_eq!(spec.range(12), 10..12);
    }

    #[test]
    fn zero_page_size_is_raised() {
        assert_eq!(PageSpec::new(0).page_size(), 1);
    }
}
