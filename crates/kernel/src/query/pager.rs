//! Page window computation and paged results.

use serde::Serialize;

/// Page size used when the configuration gives none.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Page size cap used when the configuration gives none.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Turns untrusted page parameters into a bounded window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    default_size: u32,
    max_size: u32,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)
    }
}

impl Pager {
    /// Create a pager. A zero default becomes 1 and the cap is raised to
    /// at least the default.
    pub fn new(default_size: u32, max_size: u32) -> Self {
        let default_size = default_size.max(1);
        Self {
            default_size,
            max_size: max_size.max(default_size),
        }
    }

    pub fn default_size(&self) -> u32 {
        self.default_size
    }

    pub fn max_size(&self) -> u32 {
        self.max_size
    }

    /// Normalize raw parameters.
    ///
    /// Page numbers below 1 (or absent) become 1. Absent or non-positive
    /// page sizes use the configured default; sizes above the cap are
    /// clamped to it.
    pub fn window(&self, raw_page: Option<i64>, raw_size: Option<i64>) -> PageWindow {
        let page = match raw_page {
            Some(p) if p >= 1 => u32::try_from(p).unwrap_or(u32::MAX),
            _ => 1,
        };

        let per_page = match raw_size {
            Some(s) if s >= 1 => {
                let requested = u32::try_from(s).unwrap_or(u32::MAX);
                if requested > self.max_size {
                    tracing::warn!(
                        requested = s,
                        capped = self.max_size,
                        "page_size exceeds maximum, capping"
                    );
                    self.max_size
                } else {
                    requested
                }
            }
            _ => self.default_size,
        };

        PageWindow { page, per_page }
    }
}

/// Normalized (page, size) pair; always `page >= 1` and `per_page >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub page: u32,
    pub per_page: u32,
}

impl PageWindow {
    /// Rows skipped before this page: `(page - 1) * per_page`.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }

    /// Rows returned at most.
    pub fn limit(&self) -> u64 {
        u64::from(self.per_page)
    }
}

/// One page of results plus paging metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    /// Rows on this page, in sort order.
    pub items: Vec<T>,

    /// Total matching rows (before paging).
    pub total: u64,

    /// Current page number (1-indexed).
    pub page: u32,

    /// Rows per page.
    pub per_page: u32,

    /// Total number of pages.
    pub total_pages: u32,

    /// Whether there's a next page.
    pub has_next: bool,

    /// Whether there's a previous page.
    pub has_prev: bool,
}

impl<T> Page<T> {
    /// Create a page with paging calculations.
    pub fn new(items: Vec<T>, total: u64, window: PageWindow) -> Self {
        let total_pages = total.div_ceil(u64::from(window.per_page.max(1)));
        let total_pages = u32::try_from(total_pages).unwrap_or(u32::MAX);

        Self {
            items,
            total,
            page: window.page,
            per_page: window.per_page,
            total_pages,
            has_next: window.page < total_pages,
            has_prev: window.page > 1,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn page_below_one_is_page_one() {
        let pager = Pager::default();
        for raw in [None, Some(0), Some(-5), Some(i64::MIN)] {
            assert_eq!(pager.window(raw, Some(10)), pager.window(Some(1), Some(10)));
        }
    }

    #[test]
    fn non_positive_or_absent_size_uses_default() {
        let pager = Pager::new(25, 100);
        for raw in [None, Some(0), Some(-1)] {
            assert_eq!(pager.window(Some(1), raw).per_page, 25);
        }
    }

    #[test]
    fn size_capped_at_maximum() {
        let pager = Pager::new(10, 50);
        assert_eq!(pager.window(Some(1), Some(51)).per_page, 50);
        assert_eq!(pager.window(Some(1), Some(i64::MAX)).per_page, 50);
        assert_eq!(pager.window(Some(1), Some(50)).per_page, 50);
    }

    #[test]
    fn offset_and_limit() {
        let pager = Pager::default();
        let window = pager.window(Some(1), Some(10));
        assert_eq!((window.offset(), window.limit()), (0, 10));

        let window = pager.window(Some(3), Some(7));
        assert_eq!((window.offset(), window.limit()), (14, 7));
    }

    #[test]
    fn huge_page_numbers_do_not_overflow() {
        let window = Pager::new(10, 100).window(Some(i64::MAX), Some(100));
        assert_eq!(window.page, u32::MAX);
        assert_eq!(window.offset(), u64::from(u32::MAX - 1) * 100);
    }

    #[test]
    fn new_clamps_inconsistent_bounds() {
        let pager = Pager::new(0, 0);
        assert_eq!(pager.default_size(), 1);
        assert_eq!(pager.max_size(), 1);

        let pager = Pager::new(20, 5);
        assert_eq!(pager.max_size(), 20);
    }

    #[test]
    fn page_metadata() {
        let window = PageWindow {
            page: 2,
            per_page: 10,
        };
        let page = Page::new(vec![1, 2, 3], 23, window);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next);
        assert!(page.has_prev);

        let empty: Page<i32> = Page::new(Vec::new(), 0, Pager::default().window(None, None));
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next);
        assert!(!empty.has_prev);
    }
}
