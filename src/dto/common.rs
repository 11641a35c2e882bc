//! Shared query and response shapes used by several route groups.

use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::dao::pagination::{PageRequest, SortOrder};

/// Pagination, search and sort parameters accepted by list endpoints.
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    /// 1-based page index.
    #[validate(range(min = 1))]
    pub page: Option<i64>,
    /// Number of items per page.
    #[validate(range(min = 1, max = 100))]
    pub page_size: Option<i64>,
    /// Case-insensitive substring filter.
    #[validate(length(max = 100))]
    pub query: Option<String>,
    /// Field to sort by; unknown fields fall back to creation time.
    pub sort_field: Option<String>,
    /// Sort direction.
    pub sort_order: Option<SortOrder>,
}

impl PageQuery {
    /// Convert into the storage-level page request with defaults applied.
    pub fn into_request(self) -> PageRequest {
        PageRequest {
            page: self.page.unwrap_or(1),
            page_size: self.page_size.unwrap_or(10),
            query: self.query.filter(|q| !q.trim().is_empty()),
            sort_field: self.sort_field,
            sort_order: self.sort_order.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_applied_when_absent() {
        let query = PageQuery {
            page: None,
            page_size: None,
            query: Some("   ".into()),
            sort_field: None,
            sort_order: None,
        };
        let request = query.into_request();
        assert_eq!(request.page, 1);
        assert_eq!(request.page_size, 10);
        assert!(request.query.is_none());
        assert_eq!(request.sort_order, SortOrder::Asc);
    }
}
