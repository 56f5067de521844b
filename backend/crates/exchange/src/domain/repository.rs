//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.
//! Method names are distinct across traits so that one store can implement
//! all of them without call-site ambiguity.

use chrono::{DateTime, Utc};

use auth::User;

use crate::domain::entity::{
    BalanceSummary, CreditTerms, CreditTransaction, ExpirySweep, Member, Message, MessageView,
    Review, Session, SessionView, Skill, SkillListing,
};
use crate::domain::value_object::{MessageId, Page, SessionId, SessionStatus, SkillId, UserId};
use crate::error::ExchangeResult;

/// Skill directory
#[trait_variant::make(SkillRepository: Send)]
pub trait LocalSkillRepository {
    /// Insert a skill; a duplicate (teacher, canonical name) yields
    /// `ExchangeError::SkillNameTaken`
    async fn insert_skill(&self, skill: &Skill) -> ExchangeResult<()>;

    async fn find_skill(&self, skill_id: &SkillId) -> ExchangeResult<Option<Skill>>;

    /// All skills with teacher details, newest first
    async fn list_skills(&self) -> ExchangeResult<Vec<SkillListing>>;

    /// Skills of one teacher, newest first
    async fn list_user_skills(&self, teacher_id: &UserId) -> ExchangeResult<Vec<Skill>>;

    /// Delete a teacher's skill; `false` when no such skill belongs to them
    async fn delete_skill(&self, teacher_id: &UserId, skill_id: &SkillId) -> ExchangeResult<bool>;
}

/// Lookup of registered users
#[trait_variant::make(MemberDirectory: Send)]
pub trait LocalMemberDirectory {
    async fn find_member(&self, user_id: &UserId) -> ExchangeResult<Option<Member>>;
}

/// Learning sessions
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    async fn insert_session(&self, session: &Session) -> ExchangeResult<()>;

    async fn find_session(&self, session_id: &SessionId) -> ExchangeResult<Option<Session>>;

    /// Sessions where the user is teacher or learner, newest first
    async fn list_sessions_for(&self, user_id: &UserId) -> ExchangeResult<Vec<SessionView>>;

    /// Compare-and-set the status; `None` when the session is no longer in
    /// `from`
    async fn update_session_status(
        &self,
        session_id: &SessionId,
        from: SessionStatus,
        to: SessionStatus,
        now: DateTime<Utc>,
    ) -> ExchangeResult<Option<Session>>;

    /// Complete an accepted session and transfer credits as one unit
    ///
    /// Fails with `StaleSession` if another completion got there first,
    /// `InvalidTransition` if the session is otherwise not accepted and
    /// `InsufficientCredits` if the learner cannot pay. Nothing changes on
    /// failure.
    async fn complete_session(
        &self,
        session_id: &SessionId,
        terms: &CreditTerms,
        now: DateTime<Utc>,
    ) -> ExchangeResult<Session>;
}

/// Credit accounts and the append-only ledger
#[trait_variant::make(LedgerRepository: Send)]
pub trait LocalLedgerRepository {
    /// Open the account with the signup bonus unless it exists, expire due
    /// earns, and return the balance
    async fn open_account(
        &self,
        user_id: &UserId,
        terms: &CreditTerms,
        now: DateTime<Utc>,
    ) -> ExchangeResult<i64>;

    /// Expire every due earn in the ledger
    async fn expire_all_credits(&self, now: DateTime<Utc>) -> ExchangeResult<ExpirySweep>;

    async fn credit_summary(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
        soon_until: DateTime<Utc>,
    ) -> ExchangeResult<BalanceSummary>;

    /// Active earns with `now < expires_at <= until`, soonest first
    async fn expiring_credits(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> ExchangeResult<Vec<CreditTransaction>>;

    /// One page of the ledger, newest first, plus the total row count
    async fn credit_history(
        &self,
        user_id: &UserId,
        page: &Page,
    ) -> ExchangeResult<(Vec<CreditTransaction>, i64)>;
}

/// Reviews
#[trait_variant::make(ReviewRepository: Send)]
pub trait LocalReviewRepository {
    /// Insert; a second review of the same session by the same reviewer
    /// yields `ExchangeError::ReviewAlreadySubmitted`
    async fn insert_review(&self, review: &Review) -> ExchangeResult<()>;

    /// Reviews about `target_id`, newest first
    async fn reviews_for(&self, target_id: &UserId) -> ExchangeResult<Vec<Review>>;
}

/// Direct messages
#[trait_variant::make(MessageRepository: Send)]
pub trait LocalMessageRepository {
    async fn insert_message(&self, message: &Message) -> ExchangeResult<()>;

    async fn find_message(&self, message_id: &MessageId) -> ExchangeResult<Option<Message>>;

    /// Messages received by the user, newest first
    async fn inbox(&self, user_id: &UserId) -> ExchangeResult<Vec<MessageView>>;

    async fn unread_count(&self, user_id: &UserId) -> ExchangeResult<i64>;

    /// Both directions between two users, oldest first
    async fn conversation(&self, user_id: &UserId, other_id: &UserId)
    -> ExchangeResult<Vec<MessageView>>;

    /// Idempotent
    async fn mark_message_read(&self, message_id: &MessageId) -> ExchangeResult<()>;
}

/// Demo data to load after a reset
#[derive(Debug, Clone, Default)]
pub struct DemoSeed {
    pub users: Vec<User>,
    pub skills: Vec<Skill>,
}

/// Demo reset
#[trait_variant::make(DemoRepository: Send)]
pub trait LocalDemoRepository {
    /// Wipe all data and load `seed` in one transaction; accounts are
    /// opened with the signup bonus
    async fn reset_demo(
        &self,
        seed: &DemoSeed,
        terms: &CreditTerms,
        now: DateTime<Utc>,
    ) -> ExchangeResult<()>;
}

/// Everything the exchange handlers need from one store
pub trait ExchangeStore:
    SkillRepository
    + MemberDirectory
    + SessionRepository
    + LedgerRepository
    + ReviewRepository
    + MessageRepository
    + DemoRepository
    + Clone
    + Send
    + Sync
    + 'static
{
}

impl<T> ExchangeStore for T where
    T: SkillRepository
        + MemberDirectory
        + SessionRepository
        + LedgerRepository
        + ReviewRepository
        + MessageRepository
        + DemoRepository
        + Clone
        + Send
        + Sync
        + 'static
{
}
