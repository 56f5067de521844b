//! Account Provisioning
//!
//! Implements auth's [`AccountPort`] on top of the ledger, so signup, login
//! and verify can open accounts and read balances without the auth crate
//! knowing about credits.

use std::sync::Arc;

use auth::domain::repository::AccountPort;
use auth::{AuthResult, ProfileSkill};
use chrono::Utc;

use crate::domain::entity::CreditTerms;
use crate::domain::repository::{LedgerRepository, SkillRepository};
use crate::domain::value_object::UserId;

pub struct AccountProvisioner<R> {
    store: Arc<R>,
    terms: CreditTerms,
}

impl<R> AccountProvisioner<R> {
    pub fn new(store: Arc<R>, terms: CreditTerms) -> Self {
        Self { store, terms }
    }
}

impl<R> Clone for AccountProvisioner<R> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            terms: self.terms,
        }
    }
}

impl<R> AccountPort for AccountProvisioner<R>
where
    R: LedgerRepository + SkillRepository + Send + Sync + 'static,
{
    async fn ensure_account(&self, user_id: &UserId) -> AuthResult<i64> {
        let balance = self
            .store
            .open_account(user_id, &self.terms, Utc::now())
            .await?;
        Ok(balance)
    }

    async fn profile_skills(&self, user_id: &UserId) -> AuthResult<Vec<ProfileSkill>> {
        let skills = self.store.list_user_skills(user_id).await?;

        Ok(skills
            .into_iter()
            .map(|skill| ProfileSkill {
                id: skill.skill_id,
                name: skill.name.as_str().to_string(),
                description: skill.description.as_str().to_string(),
                created_at: skill.created_at,
            })
            .collect())
    }
}
