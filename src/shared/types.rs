use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::shared::constants::POSTS_PER_PAGE;

/// Field-level validation errors, keyed by form field name.
///
/// Ordered so the re-rendered form lists errors deterministically.
pub type FieldErrors = BTreeMap<String, String>;

// =============================================================================
// PAGINATION
// =============================================================================

/// Raw pagination query parameters for list pages.
///
/// The `page` value comes from untrusted input and is kept as a string so a
/// non-numeric value coerces to page 1 instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    /// Coerce the raw `?page=` value. Missing, non-numeric, zero or negative
    /// values all resolve to page 1.
    pub fn number(&self) -> i64 {
        parse_page_param(self.page.as_deref())
    }
}

pub fn parse_page_param(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n >= 1)
        .unwrap_or(1)
}

/// A resolved window over an ordered result set.
///
/// Page numbers are 1-based. A requested page past the end clamps to the
/// last valid page; an empty result set still has one (empty) page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: i64,
    pub total_pages: i64,
    page_size: i64,
}

impl PageWindow {
    pub fn resolve(total_items: i64, requested: i64, page_size: i64) -> Self {
        let total_pages = (total_items.max(0) + page_size - 1) / page_size;
        let total_pages = total_pages.max(1);
        Self {
            number: requested.clamp(1, total_pages),
            total_pages,
            page_size,
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.page_size
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }
}

/// One page of records plus the metadata the templates need.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub number: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_previous: bool,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(window: PageWindow, items: Vec<T>) -> Self {
        Self {
            number: window.number,
            total_pages: window.total_pages,
            has_next: window.has_next(),
            has_previous: window.has_previous(),
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_param_defaults_to_one() {
        assert_eq!(parse_page_param(None), 1);
        assert_eq!(parse_page_param(Some("")), 1);
        assert_eq!(parse_page_param(Some("abc")), 1);
        assert_eq!(parse_page_param(Some("1.5")), 1);
        assert_eq!(parse_page_param(Some("0")), 1);
        assert_eq!(parse_page_param(Some("-3")), 1);
    }

    #[test]
    fn test_parse_page_param_accepts_valid_numbers() {
        assert_eq!(parse_page_param(Some("1")), 1);
        assert_eq!(parse_page_param(Some("7")), 7);
        assert_eq!(parse_page_param(Some(" 12 ")), 12);
    }

    #[test]
    fn test_window_clamps_past_the_end() {
        let window = PageWindow::resolve(25, 99, POSTS_PER_PAGE);
        assert_eq!(window.number, 3);
        assert_eq!(window.total_pages, 3);
        assert_eq!(window.offset(), 20);
        assert!(!window.has_next());
        assert!(window.has_previous());
    }

    #[test]
    fn test_window_on_empty_result_set() {
        let window = PageWindow::resolve(0, 1, POSTS_PER_PAGE);
        assert_eq!(window.number, 1);
        assert_eq!(window.total_pages, 1);
        assert_eq!(window.offset(), 0);
        assert!(!window.has_next());
        assert!(!window.has_previous());
    }

    #[test]
    fn test_window_middle_page() {
        let window = PageWindow::resolve(31, 2, POSTS_PER_PAGE);
        assert_eq!(window.number, 2);
        assert_eq!(window.total_pages, 4);
        assert_eq!(window.limit(), 10);
        assert_eq!(window.offset(), 10);
        assert!(window.has_next());
        assert!(window.has_previous());
    }

    #[test]
    fn test_exact_multiple_of_page_size() {
        let window = PageWindow::resolve(30, 3, POSTS_PER_PAGE);
        assert_eq!(window.total_pages, 3);
        assert!(!window.has_next());
    }
}
