//! Session Use Cases
//!
//! Requesting a session, moving it through its states, and listing a
//! user's sessions. Completion hands over to the repository, which runs the
//! status write and both ledger entries in one transaction.

use std::sync::Arc;

use chrono::Utc;
use kernel::error::app_error::AppError;

use crate::application::config::ExchangeConfig;
use crate::domain::entity::{Session, SessionView};
use crate::domain::repository::{SessionRepository, SkillRepository};
use crate::domain::value_object::{SessionId, SessionStatus, SkillId, UserId};
use crate::error::{ExchangeError, ExchangeResult};

/// Learner requests a session for a listed skill
pub struct RequestSessionUseCase<R>
where
    R: SkillRepository + SessionRepository,
{
    repo: Arc<R>,
}

impl<R> RequestSessionUseCase<R>
where
    R: SkillRepository + SessionRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        learner_id: &UserId,
        skill_id: &SkillId,
        teacher_id: &UserId,
    ) -> ExchangeResult<Session> {
        let skill = self
            .repo
            .find_skill(skill_id)
            .await?
            .ok_or(ExchangeError::SkillNotFound)?;

        let session = Session::request(&skill, teacher_id, learner_id, Utc::now())?;
        self.repo.insert_session(&session).await?;

        tracing::info!(
            session_id = %session.session_id,
            skill = %session.skill_name,
            teacher_id = %session.teacher_id,
            learner_id = %session.learner_id,
            "Session requested"
        );

        Ok(session)
    }
}

/// `PUT /api/sessions/{id}`
pub struct UpdateSessionStatusUseCase<R>
where
    R: SessionRepository,
{
    repo: Arc<R>,
    config: Arc<ExchangeConfig>,
}

impl<R> UpdateSessionStatusUseCase<R>
where
    R: SessionRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<ExchangeConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(
        &self,
        actor: &UserId,
        session_id: &SessionId,
        status: &str,
    ) -> ExchangeResult<Session> {
        let target = SessionStatus::from_code(status).ok_or_else(|| {
            AppError::bad_request("Status must be one of pending, accepted, completed, rejected")
        })?;

        let session = self
            .repo
            .find_session(session_id)
            .await?
            .ok_or(ExchangeError::SessionNotFound)?;

        let transition = session.plan_transition(actor, target)?;
        let now = Utc::now();

        if transition.moves_credits() {
            let terms = &self.config.credits;
            let completed = self.repo.complete_session(session_id, terms, now).await?;

            tracing::info!(
                session_id = %session_id,
                teacher_id = %completed.teacher_id,
                learner_id = %completed.learner_id,
                learn_cost = terms.learn_cost,
                teach_reward = terms.teach_reward,
                "Session completed, credits transferred"
            );

            return Ok(completed);
        }

        let updated = self
            .repo
            .update_session_status(session_id, transition.from, transition.to, now)
            .await?
            .ok_or(ExchangeError::StaleSession)?;

        tracing::info!(
            session_id = %session_id,
            from = %transition.from,
            to = %transition.to,
            "Session status changed"
        );

        Ok(updated)
    }
}

/// Sessions where the caller teaches or learns
pub struct ListSessionsUseCase<R>
where
    R: SessionRepository,
{
    repo: Arc<R>,
}

impl<R> ListSessionsUseCase<R>
where
    R: SessionRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, user_id: &UserId) -> ExchangeResult<Vec<SessionView>> {
        self.repo.list_sessions_for(user_id).await
    }
}
