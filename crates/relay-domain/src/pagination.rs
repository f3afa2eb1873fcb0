//! Paging for list endpoints (`?page=2&limit=50`).

use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: u32 = 50;
pub const MAX_LIMIT: u32 = 200;

/// One-based page of at most `limit` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }.clamped()
    }

    /// Bring out-of-range query values back into `1..=MAX_LIMIT` rows on page `>= 1`.
    pub fn clamped(self) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.clamp(1, MAX_LIMIT),
        }
    }

    pub fn offset(self) -> u64 {
        let Self { page, limit } = self.clamped();
        u64::from(page - 1) * u64::from(limit)
    }

    pub fn limit(self) -> u64 {
        u64::from(self.clamped().limit)
    }
}
