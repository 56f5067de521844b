//! Skill Value Objects
//!
//! スキル名は教師ごとに大文字小文字を区別せず一意。
//! 一意性はストアの一意インデックス `(teacher_id, name_canonical)` が保証する。

use derive_more::Display;
use kernel::error::app_error::{AppError, AppResult};
use unicode_normalization::UnicodeNormalization;

pub const SKILL_NAME_MAX_LENGTH: usize = 100;
pub const SKILL_DESCRIPTION_MAX_LENGTH: usize = 1000;

// ============================================================================
// SkillName
// ============================================================================

/// Skill name as entered, plus its canonical (case-folded) form
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("{display}")]
pub struct SkillName {
    display: String,
    canonical: String,
}

impl SkillName {
    /// NFKC 正規化 → 空白の圧縮 → 1〜100 文字
    pub fn new(raw: impl AsRef<str>) -> AppResult<Self> {
        let normalized: String = raw.as_ref().nfkc().collect();

        if normalized.chars().any(char::is_control) {
            return Err(AppError::bad_request("Skill name contains invalid characters"));
        }

        let display = normalized.split_whitespace().collect::<Vec<_>>().join(" ");
        if display.is_empty() {
            return Err(AppError::bad_request("Skill name is required"));
        }

        let len = display.chars().count();
        if len > SKILL_NAME_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Skill name must be at most {SKILL_NAME_MAX_LENGTH} characters (got {len})"
            )));
        }

        let canonical = canonicalize(&display);
        Ok(Self { display, canonical })
    }

    /// Rehydrate from the `name` / `name_canonical` columns
    pub fn from_db(display: impl Into<String>, canonical: impl Into<String>) -> Self {
        Self {
            display: display.into(),
            canonical: canonical.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.display
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

fn canonicalize(display: &str) -> String {
    display.to_lowercase()
}

// ============================================================================
// SkillDescription
// ============================================================================

/// Free-text description, may be empty
#[derive(Debug, Clone, Default, PartialEq, Eq, Display)]
pub struct SkillDescription(String);

impl SkillDescription {
    pub fn new(raw: impl AsRef<str>) -> AppResult<Self> {
        let trimmed = raw.as_ref().trim();

        let len = trimmed.chars().count();
        if len > SKILL_DESCRIPTION_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Description must be at most {SKILL_DESCRIPTION_MAX_LENGTH} characters (got {len})"
            )));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn from_db(description: impl Into<String>) -> Self {
        Self(description.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
