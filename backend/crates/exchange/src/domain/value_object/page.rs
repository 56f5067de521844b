//! Pagination

use kernel::error::app_error::{AppError, AppResult};

/// 1-based page with a bounded size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    number: u32,
    limit: u32,
}

impl Page {
    pub const DEFAULT_LIMIT: u32 = 20;
    pub const MAX_LIMIT: u32 = 100;

    pub fn new(number: Option<u32>, limit: Option<u32>) -> AppResult<Self> {
        let number = number.unwrap_or(1);
        if number == 0 {
            return Err(AppError::bad_request("Page must be at least 1"));
        }

        let limit = limit.unwrap_or(Self::DEFAULT_LIMIT);
        if !(1..=Self::MAX_LIMIT).contains(&limit) {
            return Err(AppError::bad_request(format!(
                "Limit must be between 1 and {}",
                Self::MAX_LIMIT
            )));
        }

        Ok(Self { number, limit })
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Rows to skip
    pub fn offset(&self) -> u64 {
        u64::from(self.number - 1) * u64::from(self.limit)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            number: 1,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}
