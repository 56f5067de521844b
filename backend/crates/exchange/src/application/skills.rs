//! Skill Directory Use Cases

use std::sync::Arc;

use crate::domain::entity::{Skill, SkillListing};
use crate::domain::repository::{MemberDirectory, SkillRepository};
use crate::domain::value_object::{SkillDescription, SkillId, SkillName, UserId};
use crate::error::{ExchangeError, ExchangeResult};

/// Add skill input
pub struct AddSkillInput {
    /// `{id}` in `/api/user/{id}/skills`
    pub owner_id: UserId,
    pub name: String,
    pub description: String,
}

/// Add a skill to the caller's own list
pub struct AddSkillUseCase<R>
where
    R: SkillRepository,
{
    repo: Arc<R>,
}

impl<R> AddSkillUseCase<R>
where
    R: SkillRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, actor: &UserId, input: AddSkillInput) -> ExchangeResult<Skill> {
        if actor != &input.owner_id {
            return Err(ExchangeError::NotOwner);
        }

        let name = SkillName::new(&input.name)?;
        let description = SkillDescription::new(&input.description)?;
        let skill = Skill::new(*actor, name, description);

        // No pre-read: the unique index decides between concurrent adds
        self.repo.insert_skill(&skill).await?;

        tracing::info!(
            skill_id = %skill.skill_id,
            teacher_id = %skill.teacher_id,
            name = %skill.name,
            "Skill added"
        );

        Ok(skill)
    }
}

/// Delete one of the caller's skills
pub struct DeleteSkillUseCase<R>
where
    R: SkillRepository,
{
    repo: Arc<R>,
}

impl<R> DeleteSkillUseCase<R>
where
    R: SkillRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        actor: &UserId,
        owner_id: &UserId,
        skill_id: &SkillId,
    ) -> ExchangeResult<()> {
        if actor != owner_id {
            return Err(ExchangeError::NotOwner);
        }

        if !self.repo.delete_skill(owner_id, skill_id).await? {
            return Err(ExchangeError::SkillNotFound);
        }

        tracing::info!(skill_id = %skill_id, teacher_id = %owner_id, "Skill deleted");

        Ok(())
    }
}

/// Read-only skill queries
pub struct BrowseSkillsUseCase<R>
where
    R: SkillRepository + MemberDirectory,
{
    repo: Arc<R>,
}

impl<R> BrowseSkillsUseCase<R>
where
    R: SkillRepository + MemberDirectory,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Every listing with its teacher
    pub async fn all(&self) -> ExchangeResult<Vec<SkillListing>> {
        self.repo.list_skills().await
    }

    /// Skills offered by one user
    pub async fn of_user(&self, user_id: &UserId) -> ExchangeResult<Vec<Skill>> {
        if self.repo.find_member(user_id).await?.is_none() {
            return Err(ExchangeError::UserNotFound);
        }
        self.repo.list_user_skills(user_id).await
    }
}
