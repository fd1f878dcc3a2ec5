//! Pagination metadata returned with order listings.

use serde::{Deserialize, Serialize};

use super::PageRequest;

/// Paging summary for a listing response.
///
/// # Examples
///
/// ```
/// use orders_backend::domain::{PageRequest, Pagination};
///
/// let pagination = Pagination::new(PageRequest::new(2, 10), 25);
/// assert_eq!(pagination.total_pages, 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl Pagination {
    /// Derive metadata from the served page and the matching total.
    pub fn new(page: PageRequest, total: u64) -> Self {
        Self {
            current_page: page.page(),
            limit: page.limit(),
            total,
            total_pages: total.div_ceil(u64::from(page.limit())),
        }
    }
}
