//! Review Value Objects

use kernel::error::app_error::{AppError, AppResult};
use serde::Serialize;

pub const REVIEW_TEXT_MAX_LENGTH: usize = 2000;

/// Star rating, 1 to 5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Rating(i16);

impl Rating {
    pub const MIN: i16 = 1;
    pub const MAX: i16 = 5;

    pub fn new(value: i64) -> AppResult<Self> {
        if !(Self::MIN as i64..=Self::MAX as i64).contains(&value) {
            return Err(AppError::bad_request(format!(
                "Rating must be between {} and {}",
                Self::MIN,
                Self::MAX
            )));
        }
        Ok(Self(value as i16))
    }

    pub fn from_db(value: i16) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i16 {
        self.0
    }
}

/// Optional review comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReviewText(String);

impl ReviewText {
    /// Blank text is no text
    pub fn new(raw: Option<&str>) -> AppResult<Option<Self>> {
        let Some(trimmed) = raw.map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok(None);
        };

        let len = trimmed.chars().count();
        if len > REVIEW_TEXT_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Review text must be at most {REVIEW_TEXT_MAX_LENGTH} characters (got {len})"
            )));
        }

        Ok(Some(Self(trimmed.to_string())))
    }

    pub fn from_db(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(0).is_err());
        assert!(Rating::new(6).is_err());
        assert!(Rating::new(-1).is_err());
        assert_eq!(Rating::new(1).unwrap().value(), 1);
        assert_eq!(Rating::new(5).unwrap().value(), 5);
    }

    #[test]
    fn test_review_text() {
        assert_eq!(ReviewText::new(None).unwrap(), None);
        assert_eq!(ReviewText::new(Some("   ")).unwrap(), None);
        assert_eq!(
            ReviewText::new(Some(" Patient teacher ")).unwrap().unwrap().as_str(),
            "Patient teacher"
        );
        assert!(ReviewText::new(Some(&"r".repeat(REVIEW_TEXT_MAX_LENGTH + 1))).is_err());
    }
}
