use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Pagination parameters accepted by every list endpoint
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct PageQuery {
    /// 1-based page number
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: Option<u32>,

    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<u32>,
}

impl PageQuery {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page: Some(page), limit: Some(limit) }
    }

    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    /// Number of rows to skip: `(page - 1) * limit`
    pub fn offset(&self) -> usize {
        (self.page() as usize - 1) * self.limit() as usize
    }
}

/// One page of a list together with the size of the whole collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, query: &PageQuery) -> Self {
        Self { items, total, page: query.page(), limit: query.limit() }
    }

    pub fn empty(query: &PageQuery) -> Self {
        Self::new(Vec::new(), 0, query)
    }
}

/// Common error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Result of a delete
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteResponse {
    pub success: bool,
}
