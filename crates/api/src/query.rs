//! Shared query parameter types for API handlers.

use agora_core::pagination::Page;
use serde::Deserialize;

/// Page-number pagination (`?page_number=&page_size=`).
///
/// Values are clamped by [`Page::new`].
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page_number: Option<i64>,
    pub page_size: Option<i64>,
}

impl PageParams {
    pub fn page(&self) -> Page {
        Page::new(self.page_number, self.page_size)
    }
}

