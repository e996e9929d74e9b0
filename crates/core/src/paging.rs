//! Page-number pagination for admin list endpoints.
//!
//! Lists are unpaged unless the caller sends `page` or `size`; once either is
//! present both are clamped and the response carries a [`Paging`] block.

use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// A clamped page request. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub size: i64,
}

impl PageRequest {
    /// Build from raw query values. Returns `None` when neither is given.
    pub fn from_query(page: Option<i64>, size: Option<i64>) -> Option<Self> {
        if page.is_none() && size.is_none() {
            return None;
        }
        Some(Self {
            page: page.unwrap_or(1).max(1),
            size: size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        })
    }

    pub fn limit(&self) -> i64 {
        self.size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.size)
    }

    /// Paging metadata for a result set of `total_item` rows.
    pub fn paging(&self, total_item: i64) -> Paging {
        let total_page = if total_item <= 0 {
            0
        } else {
            (total_item + self.size - 1) / self.size
        };
        Paging {
            page: self.page,
            size: self.size,
            total_item,
            total_page,
        }
    }
}

/// The `paging` member of the response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Paging {
    pub page: i64,
    pub size: i64,
    pub total_item: i64,
    pub total_page: i64,
}
