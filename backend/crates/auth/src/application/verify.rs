//! Verify Use Case
//!
//! Resolves a verified token to the caller's profile.

use std::sync::Arc;

use crate::application::token::TokenClaims;
use crate::domain::entity::{ProfileSkill, User};
use crate::domain::repository::{AccountPort, UserRepository};
use crate::error::{AuthError, AuthResult};

/// Profile returned by `GET /auth/verify`
#[derive(Debug)]
pub struct VerifyOutput {
    pub user: User,
    pub credits: i64,
    pub skills: Vec<ProfileSkill>,
}

/// Verify use case
pub struct VerifyUseCase<U, A>
where
    U: UserRepository,
    A: AccountPort,
{
    user_repo: Arc<U>,
    accounts: Arc<A>,
}

impl<U, A> VerifyUseCase<U, A>
where
    U: UserRepository,
    A: AccountPort,
{
    pub fn new(user_repo: Arc<U>, accounts: Arc<A>) -> Self {
        Self {
            user_repo,
            accounts,
        }
    }

    pub async fn execute(&self, claims: &TokenClaims) -> AuthResult<VerifyOutput> {
        // A valid signature for a user that no longer exists (demo reset)
        let user = self
            .user_repo
            .find_user_by_id(&claims.user_id)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        let credits = self.accounts.ensure_account(&user.user_id).await?;
        let skills = self.accounts.profile_skills(&user.user_id).await?;

        Ok(VerifyOutput {
            user,
            credits,
            skills,
        })
    }
}
