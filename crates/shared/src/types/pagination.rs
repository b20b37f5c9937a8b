//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};

/// Largest page size a caller may request; anything bigger is clamped.
pub const MAX_PER_PAGE: u32 = 200;

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-indexed).
    #[serde(default = "default_page")]
    pub page: u32,
    /// Number of items per page, clamped to `1..=MAX_PER_PAGE`.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    50
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PageRequest {
    /// The page size actually used, with out-of-range requests clamped.
    #[must_use]
    pub fn effective_per_page(&self) -> u32 {
        self.per_page.clamp(1, MAX_PER_PAGE)
    }

    /// Calculates the offset for database queries.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.effective_per_page())
    }

    /// Returns the limit for database queries.
    #[must_use]
    pub fn limit(&self) -> u64 {
        u64::from(self.effective_per_page())
    }
}

/// Response wrapper for paginated data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// The items in the current page.
    pub data: Vec<T>,
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items across all pages.
    pub total: u64,
}

impl<T> PageResponse<T> {
    /// Wraps a page of items with its pagination metadata.
    #[must_use]
    pub fn new(data: Vec<T>, request: &PageRequest, total: u64) -> Self {
        Self {
            data,
            page: request.page,
            per_page: request.effective_per_page(),
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_first_page_is_zero() {
        let req = PageRequest { page: 1, per_page: 50 };
        assert_eq!(req.offset(), 0);
        assert_eq!(req.limit(), 50);
    }

    #[test]
    fn test_offset_later_pages() {
        let req = PageRequest { page: 3, per_page: 20 };
        assert_eq!(req.offset(), 40);
    }

    #[test]
    fn test_page_zero_clamps_to_zero_offset() {
        let req = PageRequest { page: 0, per_page: 20 };
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn test_per_page_clamped_to_maximum() {
        let req = PageRequest {
            page: 2,
            per_page: u32::MAX,
        };
        assert_eq!(req.limit(), u64::from(MAX_PER_PAGE));
        assert_eq!(req.offset(), u64::from(MAX_PER_PAGE));
        assert_eq!(PageResponse::new(Vec::<u8>::new(), &req, 0).per_page, MAX_PER_PAGE);
    }

    #[test]
    fn test_per_page_zero_clamped_to_one() {
        let req = PageRequest { page: 1, per_page: 0 };
        assert_eq!(req.limit(), 1);
    }
}
