//! Page-based listing for endpoints that can return many rows.

use serde::{Deserialize, Serialize};

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_PER_PAGE: u32 = 20;
const MAX_PER_PAGE: u32 = 100;

/// A sanitized page request. Construct via [`PageRequest::from_query`] so
/// the page is at least 1 and the page size stays within bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number, 1-indexed.
    pub page: u32,
    /// Rows per page.
    pub per_page: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    /// Builds a request from optional query parameters, clamping the page
    /// size to 1..=100 and the page number to at least 1.
    #[must_use]
    pub fn from_query(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(DEFAULT_PAGE).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    /// Row offset for the database query.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }

    /// Row limit for the database query.
    #[must_use]
    pub fn limit(&self) -> u64 {
        u64::from(self.per_page)
    }
}

/// One page of results plus the metadata a client needs to page further.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// Rows on this page.
    pub data: Vec<T>,
    /// Paging metadata.
    pub meta: PageMeta,
}

/// Paging metadata carried on every page response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMeta {
    /// Page number served.
    pub page: u32,
    /// Rows per page requested.
    pub per_page: u32,
    /// Total rows across all pages.
    pub total: u64,
    /// Total page count; an empty result still reports one page.
    pub total_pages: u32,
}

impl<T> PageResponse<T> {
    /// Wraps one page of rows with its metadata.
    #[must_use]
    pub fn new(data: Vec<T>, request: &PageRequest, total: u64) -> Self {
        let per_page = u64::from(request.per_page.max(1));
        let total_pages = if total == 0 {
            1
        } else {
            u32::try_from(total.div_ceil(per_page)).unwrap_or(u32::MAX)
        };

        Self {
            data,
            meta: PageMeta {
                page: request.page,
                per_page: request.per_page,
                total,
                total_pages,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_query_defaults() {
        let req = PageRequest::from_query(None, None);
        assert_eq!(req.page, 1);
        assert_eq!(req.per_page, 20);
    }

    #[test]
    fn test_from_query_clamps() {
        let req = PageRequest::from_query(Some(0), Some(10_000));
        assert_eq!(req.page, 1);
        assert_eq!(req.per_page, 100);
    }

    #[test]
    fn test_offset_and_limit() {
        let req = PageRequest::from_query(Some(3), Some(25));
        assert_eq!(req.offset(), 50);
        assert_eq!(req.limit(), 25);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let req = PageRequest::from_query(Some(1), Some(20));
        let resp: PageResponse<u8> = PageResponse::new(vec![], &req, 41);
        assert_eq!(resp.meta.total_pages, 3);
    }

    #[test]
    fn test_empty_result_still_reports_one_page() {
        let req = PageRequest::default();
        let resp: PageResponse<u8> = PageResponse::new(vec![], &req, 0);
        assert_eq!(resp.meta.total_pages, 1);
    }
}
