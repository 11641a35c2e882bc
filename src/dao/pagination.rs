//! Shared pagination contract used by every list query.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Direction applied to the sort field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Ascending, the default when unspecified.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

/// Input of a paginated list query.
#[derive(Debug, Clone)]
pub struct PageRequest {
    /// 1-based page number; values below 1 behave like page 1.
    pub page: i64,
    /// Number of results per page, at least 1.
    pub page_size: i64,
    /// Case-insensitive substring matched against the designated field.
    pub query: Option<String>,
    /// Field to sort on; store-specific default when absent.
    pub sort_field: Option<String>,
    /// Sort direction.
    pub sort_order: SortOrder,
}

impl PageRequest {
    /// Number of documents to skip before the requested page.
    pub fn skip(&self) -> u64 {
        let page = self.page.max(1);
        ((page - 1) * self.page_size.max(1)) as u64
    }

    /// Effective page size, clamped to at least 1.
    pub fn limit(&self) -> i64 {
        self.page_size.max(1)
    }
}

/// Output of a paginated list query.
#[derive(Debug, Clone, Serialize)]
pub struct PageResponse<T> {
    /// Results for the requested page, never more than `page_size`.
    pub results: Vec<T>,
    /// Total number of matching documents.
    pub total: u64,
    /// `ceil(total / page_size)`.
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

impl<T> PageResponse<T> {
    /// Assemble a page, computing `total_pages` from the request's page size.
    pub fn new(results: Vec<T>, total: u64, page_size: i64) -> Self {
        Self {
            results,
            total,
            total_pages: total_pages(total, page_size),
        }
    }

    /// Map the results to a different representation, keeping the counters.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            results: self.results.into_iter().map(f).collect(),
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

/// `ceil(total / page_size)` with the page size clamped to at least 1.
pub fn total_pages(total: u64, page_size: i64) -> u64 {
    let size = page_size.max(1) as u64;
    total.div_ceil(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(page: i64, page_size: i64) -> PageRequest {
        PageRequest {
            page,
            page_size,
            query: None,
            sort_field: None,
            sort_order: SortOrder::default(),
        }
    }

    #[test]
    fn total_pages_is_ceiling_division() {
        for total in 0..200u64 {
            for size in 1..20i64 {
                let expected = (total as f64 / size as f64).ceil() as u64;
                assert_eq!(total_pages(total, size), expected, "total={total} size={size}");
            }
        }
    }

    #[test]
    fn skip_is_zero_for_page_zero_and_negative_pages() {
        assert_eq!(request(0, 10).skip(), 0);
        assert_eq!(request(-3, 10).skip(), 0);
        assert_eq!(request(1, 10).skip(), 0);
        assert_eq!(request(2, 10).skip(), 10);
        assert_eq!(request(5, 25).skip(), 100);
    }

    #[test]
    fn page_size_is_clamped() {
        assert_eq!(request(1, 0).limit(), 1);
        assert_eq!(request(1, -7).limit(), 1);
        assert_eq!(total_pages(10, 0), 10);
    }

    #[test]
    fn map_preserves_counters() {
        let page = PageResponse::new(vec![1, 2, 3], 7, 3);
        let mapped = page.map(|n| n.to_string());
        assert_eq!(mapped.total, 7);
        assert_eq!(mapped.total_pages, 3);
        assert_eq!(mapped.results, vec!["1", "2", "3"]);
    }
}
