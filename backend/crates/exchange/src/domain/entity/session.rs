//! Session Entity
//!
//! A learner's request to be taught one skill listing, and the state machine
//! that governs it. Only the transition into `completed` moves credits; the
//! ledger side of that is carried out atomically by the repository.

use chrono::{DateTime, Utc};

use crate::domain::entity::skill::Skill;
use crate::domain::value_object::{SessionId, SessionStatus, SkillId, UserId};
use crate::error::{ExchangeError, ExchangeResult};

/// Learning session
#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: SessionId,
    /// `None` once the listing has been deleted
    pub skill_id: Option<SkillId>,
    /// Name of the skill when the session was requested
    pub skill_name: String,
    pub teacher_id: UserId,
    pub learner_id: UserId,
    pub status: SessionStatus,
    pub requested_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// A checked status change, not yet persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTransition {
    pub from: SessionStatus,
    pub to: SessionStatus,
}

impl SessionTransition {
    /// Completion is the only transition with ledger effects
    pub fn moves_credits(&self) -> bool {
        self.to == SessionStatus::Completed
    }
}

impl Session {
    /// Learner requests `skill`; `teacher_id` is what the client claims the
    /// teacher to be and must match the listing
    pub fn request(
        skill: &Skill,
        teacher_id: &UserId,
        learner_id: &UserId,
        now: DateTime<Utc>,
    ) -> ExchangeResult<Self> {
        if &skill.teacher_id != teacher_id {
            return Err(ExchangeError::TeacherMismatch);
        }
        if &skill.teacher_id == learner_id {
            return Err(ExchangeError::SelfRequest);
        }

        Ok(Self {
            session_id: SessionId::new(),
            skill_id: Some(skill.skill_id),
            skill_name: skill.name.as_str().to_string(),
            teacher_id: skill.teacher_id,
            learner_id: *learner_id,
            status: SessionStatus::Pending,
            requested_at: now,
            completed_at: None,
            updated_at: now,
        })
    }

    pub fn is_participant(&self, user_id: &UserId) -> bool {
        &self.teacher_id == user_id || &self.learner_id == user_id
    }

    /// The other participant
    pub fn counterpart_of(&self, user_id: &UserId) -> Option<UserId> {
        if &self.teacher_id == user_id {
            Some(self.learner_id)
        } else if &self.learner_id == user_id {
            Some(self.teacher_id)
        } else {
            None
        }
    }

    /// Check that `actor` may move this session to `target`
    pub fn plan_transition(
        &self,
        actor: &UserId,
        target: SessionStatus,
    ) -> ExchangeResult<SessionTransition> {
        if !self.is_participant(actor) {
            return Err(ExchangeError::NotParticipant);
        }
        if target.is_teacher_decision() && &self.teacher_id != actor {
            return Err(ExchangeError::OnlyTeacher);
        }
        if !self.status.can_transition_to(target) {
            return Err(ExchangeError::InvalidTransition {
                from: self.status,
                to: target,
            });
        }

        Ok(SessionTransition {
            from: self.status,
            to: target,
        })
    }
}

/// Session joined with participant names for listings
#[derive(Debug, Clone)]
pub struct SessionView {
    pub session: Session,
    pub teacher_name: String,
    pub learner_name: String,
}
