//! Direct Message Text

use kernel::error::app_error::{AppError, AppResult};

pub const MESSAGE_TEXT_MAX_LENGTH: usize = 2000;

/// Body of a direct message, 1 to 2000 characters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageText(String);

impl MessageText {
    pub fn new(raw: impl AsRef<str>) -> AppResult<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(AppError::bad_request("Message text is required"));
        }

        let len = trimmed.chars().count();
        if len > MESSAGE_TEXT_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Message must be at most {MESSAGE_TEXT_MAX_LENGTH} characters (got {len})"
            )));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn from_db(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
