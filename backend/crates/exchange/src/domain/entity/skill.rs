//! Skill Entity

use chrono::{DateTime, Utc};

use crate::domain::value_object::{SkillDescription, SkillId, SkillName, UserId};

/// A skill a user offers to teach
#[derive(Debug, Clone)]
pub struct Skill {
    pub skill_id: SkillId,
    /// Owner; only they may delete it
    pub teacher_id: UserId,
    pub name: SkillName,
    pub description: SkillDescription,
    pub created_at: DateTime<Utc>,
}

impl Skill {
    pub fn new(teacher_id: UserId, name: SkillName, description: SkillDescription) -> Self {
        Self {
            skill_id: SkillId::new(),
            teacher_id,
            name,
            description,
            created_at: Utc::now(),
        }
    }
}

/// Directory entry joined with the teacher's public details
#[derive(Debug, Clone)]
pub struct SkillListing {
    pub skill: Skill,
    pub teacher_name: String,
    pub teacher_email: String,
}
