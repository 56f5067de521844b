//! Profile Projection
//!
//! Skills listed by a user, as returned by `GET /auth/verify`.

use chrono::{DateTime, Utc};
use kernel::id::SkillId;
use serde::Serialize;

/// A skill on the caller's own profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSkill {
    pub id: SkillId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}
