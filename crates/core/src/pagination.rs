//! Page-number pagination shared by list endpoints.

use serde::{Deserialize, Serialize};

/// Default page size when the client does not ask for one.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Highest page number, keeping `offset()` within `i64` for any page size.
pub const MAX_PAGE_NUMBER: i64 = i64::MAX / MAX_PAGE_SIZE;

/// A validated, 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub number: i64,
    pub size: i64,
}

impl Page {
    /// Clamp raw client input into a usable page.
    ///
    /// Missing or non-positive numbers fall back to page 1 and larger ones
    /// are capped at [`MAX_PAGE_NUMBER`]. Sizes are clamped to
    /// `1..=MAX_PAGE_SIZE`.
    pub fn new(number: Option<i64>, size: Option<i64>) -> Self {
        Self {
            number: number.filter(|n| *n > 0).unwrap_or(1).min(MAX_PAGE_NUMBER),
            size: size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn limit(&self) -> i64 {
        self.size
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1).saturating_mul(self.size)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results plus the total number of matching rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: i64,
}
