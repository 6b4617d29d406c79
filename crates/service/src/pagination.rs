//! Page-based pagination for list operations.
//!
//! `PageRequest` is taken verbatim from the caller (no validation);
//! `Window` is the clamped offset/limit handed to repositories and
//! `Page` is the envelope returned to clients.

use serde::{Deserialize, Serialize};

/// Pagination parameters as supplied by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page index
    pub page_number: i32,
    /// items per page
    pub page_size: i32,
}

/// Row slice to fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub offset: u64,
    pub limit: u64,
}

impl PageRequest {
    pub const DEFAULT_PAGE_NUMBER: i32 = 1;
    pub const DEFAULT_PAGE_SIZE: i32 = 10;

    /// Offset `(page_number - 1) * page_size` and limit `page_size`, both floored at zero.
    pub fn window(self) -> Window {
        let offset = (i64::from(self.page_number) - 1) * i64::from(self.page_size);
        Window { offset: offset.max(0) as u64, limit: self.page_size.max(0) as u64 }
    }

    /// `ceil(total / page_size)`, or 0 when the page size is not positive.
    pub fn total_pages(self, total_items: u64) -> u64 {
        if self.page_size <= 0 { return 0; }
        total_items.div_ceil(self.page_size as u64)
    }
}

impl Default for PageRequest {
    fn default() -> Self { Self { page_number: Self::DEFAULT_PAGE_NUMBER, page_size: Self::DEFAULT_PAGE_SIZE } }
}

/// Paginated envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub total_items: u64,
    pub page_number: i32,
    pub page_size: i32,
    pub total_pages: u64,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(request: PageRequest, total_items: u64, items: Vec<T>) -> Self {
        Self {
            total_items,
            page_number: request.page_number,
            page_size: request.page_size,
            total_pages: request.total_pages(total_items),
            items,
        }
    }
}
