//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Pagination parameters accepted by list endpoints
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageParams {
    /// Requested page, 1-based
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Page size, clamped to 1..=100
    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(10).clamp(1, 100)
    }

    /// Row offset for the requested page
    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * i64::from(self.limit())
    }
}

/// Paginated list response
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total_pages: i64,
    pub current_page: u32,
    pub total: i64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, page: u32, limit: u32) -> Self {
        let limit = i64::from(limit.max(1));
        Self {
            items,
            total_pages: (total + limit - 1) / limit,
            current_page: page,
            total,
        }
    }
}
