//! Display Name Value Object
//!
//! 画面に表示される名前。ログインには使わないため一意性は不要。
//!
//! ## 不変条件
//! - NFKC 正規化後、前後の空白を除去
//! - 1〜80 文字
//! - 制御文字を含まない
//! - 連続する空白は 1 つにまとめる

use derive_more::Display;
use kernel::error::app_error::{AppError, AppResult};
use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

pub const DISPLAY_NAME_MAX_LENGTH: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize)]
#[serde(transparent)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(raw: impl AsRef<str>) -> AppResult<Self> {
        let normalized: String = raw.as_ref().nfkc().collect();

        if normalized.chars().any(char::is_control) {
            return Err(AppError::bad_request("Name contains invalid characters"));
        }

        let collapsed = normalized.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            return Err(AppError::bad_request("Name is required"));
        }

        let len = collapsed.chars().count();
        if len > DISPLAY_NAME_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Name must be at most {DISPLAY_NAME_MAX_LENGTH} characters (got {len})"
            )));
        }

        Ok(Self(collapsed))
    }

    pub fn from_db(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_trims_and_collapses() {
        let name = DisplayName::new("  Alice   Johnson ").unwrap();
        assert_eq!(name.as_str(), "Alice Johnson");
    }

    #[test]
    fn test_display_name_nfkc() {
        // 全角英字は半角に正規化される
        let name = DisplayName::new("Ａｌｉｃｅ").unwrap();
        assert_eq!(name.as_str(), "Alice");
    }

    #[test]
    fn test_display_name_rejects_empty_and_control() {
        assert!(DisplayName::new("   ").is_err());
        assert!(DisplayName::new("Bob\u{0}").is_err());
    }

    #[test]
    fn test_display_name_length_limit() {
        assert!(DisplayName::new("a".repeat(DISPLAY_NAME_MAX_LENGTH)).is_ok());
        assert!(DisplayName::new("a".repeat(DISPLAY_NAME_MAX_LENGTH + 1)).is_err());
    }
}
