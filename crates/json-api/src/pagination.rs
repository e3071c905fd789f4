//! Pagination

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};

use rentals_app::domain::pagination::Page;

/// Pagination Metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub(crate) struct PaginationResponse {
    /// Current page, starting at 1
    pub page: u32,

    /// Page size
    pub limit: u32,

    /// Items across all pages
    pub total: u64,

    /// Number of pages
    pub pages: u64,
}

impl<T> From<&Page<T>> for PaginationResponse {
    fn from(page: &Page<T>) -> Self {
        Self {
            page: page.page,
            limit: page.limit,
            total: page.total,
            pages: page.pages(),
        }
    }
}
