//! # Pagination Slicer
//! Cuts an ordered collection into 1-based pages. Out-of-range pages come back
//! empty instead of failing.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub page_size: usize,
}

impl<T: Clone> Page<T> {
    /// Page `0` is read as page `1`; a zero page size as `1`.
    pub fn slice(items: &[T], page: usize, page_size: usize) -> Self {
        let page = page.max(1);
        let page_size = page_size.max(1);
        let total = items.len();
        let start = (page - 1).saturating_mul(page_size);
        let visible = if start >= total {
            Vec::new()
        } else {
            let end = start.saturating_add(page_size).min(total);
            items[start..end].to_vec()
        };
        Self {
            items: visible,
            total,
            total_pages: total_pages(total, page_size),
            current_page: page,
            page_size,
        }
    }
}

impl<T> Page<T> {
    pub fn has_more(&self) -> bool {
        self.total > self.current_page.saturating_mul(self.page_size)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// `ceil(total / page_size)`; zero items give zero pages.
pub fn total_pages(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1))
}
