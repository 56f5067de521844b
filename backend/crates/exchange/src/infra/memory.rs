//! In-Memory Store
//!
//! A single mutex-guarded state implementing every exchange repository plus
//! auth's `UserRepository`, so the whole HTTP surface can be exercised
//! without Postgres. Each operation holds the lock for its full duration,
//! which gives the same atomicity the Postgres transactions give.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use auth::domain::repository::UserRepository;
use auth::domain::value_object::Email;
use auth::{AuthError, AuthResult, User};
use chrono::{DateTime, Duration, Utc};

use crate::domain::entity::{
    BalanceSummary, CreditTerms, CreditTransaction, ExpirySweep, Member, Message, MessageView,
    Review, SIGNUP_BONUS_REASON, Session, SessionView, Skill, SkillListing,
};
use crate::domain::repository::{
    DemoRepository, DemoSeed, LedgerRepository, MemberDirectory, MessageRepository,
    ReviewRepository, SessionRepository, SkillRepository,
};
use crate::domain::value_object::{
    MessageId, Page, SessionId, SessionStatus, SkillId, TransactionStatus, UserId,
};
use crate::error::{ExchangeError, ExchangeResult};

#[derive(Default)]
struct State {
    users: Vec<User>,
    accounts: HashMap<UserId, i64>,
    ledger: Vec<CreditTransaction>,
    skills: Vec<Skill>,
    sessions: Vec<Session>,
    reviews: Vec<Review>,
    messages: Vec<Message>,
}

impl State {
    fn member(&self, user_id: &UserId) -> Option<Member> {
        self.users
            .iter()
            .find(|u| &u.user_id == user_id)
            .map(|u| Member {
                user_id: u.user_id,
                name: u.display_name.as_str().to_string(),
                email: u.email.as_str().to_string(),
            })
    }

    /// Rows may only reference existing users
    fn ensure_user(&self, user_id: &UserId) -> ExchangeResult<()> {
        if self.users.iter().any(|u| &u.user_id == user_id) {
            Ok(())
        } else {
            Err(ExchangeError::UserNotFound)
        }
    }

    fn name_of(&self, user_id: &UserId) -> String {
        self.member(user_id).map(|m| m.name).unwrap_or_default()
    }

    fn open_account(&mut self, user_id: &UserId, terms: &CreditTerms, now: DateTime<Utc>) -> bool {
        if self.accounts.contains_key(user_id) {
            return false;
        }
        self.accounts.insert(*user_id, terms.signup_bonus);
        self.ledger.push(CreditTransaction::earn(
            *user_id,
            terms.signup_bonus,
            SIGNUP_BONUS_REASON,
            None,
            now,
            terms.earn_lifetime,
        ));
        true
    }

    /// Returns (transactions, amount) expired for the user
    fn expire_user(&mut self, user_id: &UserId, now: DateTime<Utc>) -> (u64, i64) {
        let (mut count, mut amount) = (0, 0);
        for tx in self
            .ledger
            .iter_mut()
            .filter(|tx| &tx.user_id == user_id && tx.is_due_at(now))
        {
            tx.status = TransactionStatus::Expired;
            count += 1;
            amount += tx.amount;
        }
        if count > 0 {
            if let Some(balance) = self.accounts.get_mut(user_id) {
                *balance -= amount;
            }
        }
        (count, amount)
    }

    fn append(&mut self, entry: CreditTransaction) {
        if let Some(balance) = self.accounts.get_mut(&entry.user_id) {
            *balance += entry.signed_amount();
        }
        self.ledger.push(entry);
    }

    fn session_view(&self, session: &Session) -> SessionView {
        SessionView {
            session: session.clone(),
            teacher_name: self.name_of(&session.teacher_id),
            learner_name: self.name_of(&session.learner_id),
        }
    }

    fn message_view(&self, message: &Message) -> MessageView {
        MessageView {
            message: message.clone(),
            sender_name: self.name_of(&message.sender_id),
            receiver_name: self.name_of(&message.receiver_id),
        }
    }
}

/// Newest first; later inserts win ties
fn newest_first<T>(
    items: impl DoubleEndedIterator<Item = T>,
    at: impl Fn(&T) -> DateTime<Utc>,
) -> Vec<T> {
    let mut items: Vec<T> = items.rev().collect();
    items.sort_by_key(|item| std::cmp::Reverse(at(item)));
    items
}

/// In-process store for tests and local experiments
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move every ledger timestamp `by` into the past, as if that much time
    /// had gone by since the entries were written
    pub fn age_ledger(&self, by: Duration) {
        let mut state = self.state();
        for tx in state.ledger.iter_mut() {
            tx.created_at -= by;
            tx.expires_at = tx.expires_at.map(|at| at - by);
        }
    }

    /// Cached balance, without applying expiry
    pub fn cached_balance(&self, user_id: &UserId) -> Option<i64> {
        self.state().accounts.get(user_id).copied()
    }

    /// Every ledger entry of the user, oldest first
    pub fn ledger_of(&self, user_id: &UserId) -> Vec<CreditTransaction> {
        self.state()
            .ledger
            .iter()
            .filter(|tx| &tx.user_id == user_id)
            .cloned()
            .collect()
    }
}

// ============================================================================
// Auth
// ============================================================================

impl UserRepository for MemoryStore {
    async fn create_user(&self, user: &User) -> AuthResult<()> {
        let mut state = self.state();
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(AuthError::EmailTaken);
        }
        state.users.push(user.clone());
        Ok(())
    }

    async fn find_user_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self.state().users.iter().find(|u| &u.user_id == user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        Ok(self.state().users.iter().find(|u| &u.email == email).cloned())
    }
}

// ============================================================================
// Exchange
// ============================================================================

impl SkillRepository for MemoryStore {
    async fn insert_skill(&self, skill: &Skill) -> ExchangeResult<()> {
        let mut state = self.state();
        state.ensure_user(&skill.teacher_id)?;
        if state.skills.iter().any(|s| {
            s.teacher_id == skill.teacher_id && s.name.canonical() == skill.name.canonical()
        }) {
            return Err(ExchangeError::SkillNameTaken);
        }
        state.skills.push(skill.clone());
        Ok(())
    }

    async fn find_skill(&self, skill_id: &SkillId) -> ExchangeResult<Option<Skill>> {
        Ok(self.state().skills.iter().find(|s| &s.skill_id == skill_id).cloned())
    }

    async fn list_skills(&self) -> ExchangeResult<Vec<SkillListing>> {
        let state = self.state();
        let listings = state.skills.iter().filter_map(|skill| {
            state.member(&skill.teacher_id).map(|teacher| SkillListing {
                skill: skill.clone(),
                teacher_name: teacher.name,
                teacher_email: teacher.email,
            })
        });
        Ok(newest_first(listings, |l| l.skill.created_at))
    }

    async fn list_user_skills(&self, teacher_id: &UserId) -> ExchangeResult<Vec<Skill>> {
        let state = self.state();
        let skills = state.skills.iter().filter(|s| &s.teacher_id == teacher_id).cloned();
        Ok(newest_first(skills, |s| s.created_at))
    }

    async fn delete_skill(&self, teacher_id: &UserId, skill_id: &SkillId) -> ExchangeResult<bool> {
        let mut state = self.state();
        let before = state.skills.len();
        state
            .skills
            .retain(|s| !(&s.skill_id == skill_id && &s.teacher_id == teacher_id));
        let deleted = state.skills.len() < before;

        if deleted {
            for session in state.sessions.iter_mut() {
                if session.skill_id.as_ref() == Some(skill_id) {
                    session.skill_id = None;
                }
            }
        }
        Ok(deleted)
    }
}

impl MemberDirectory for MemoryStore {
    async fn find_member(&self, user_id: &UserId) -> ExchangeResult<Option<Member>> {
        Ok(self.state().member(user_id))
    }
}

impl SessionRepository for MemoryStore {
    async fn insert_session(&self, session: &Session) -> ExchangeResult<()> {
        let mut state = self.state();
        state.ensure_user(&session.teacher_id)?;
        state.ensure_user(&session.learner_id)?;
        state.sessions.push(session.clone());
        Ok(())
    }

    async fn find_session(&self, session_id: &SessionId) -> ExchangeResult<Option<Session>> {
        Ok(self
            .state()
            .sessions
            .iter()
            .find(|s| &s.session_id == session_id)
            .cloned())
    }

    async fn list_sessions_for(&self, user_id: &UserId) -> ExchangeResult<Vec<SessionView>> {
        let state = self.state();
        let views = state
            .sessions
            .iter()
            .filter(|s| s.is_participant(user_id))
            .map(|s| state.session_view(s));
        Ok(newest_first(views, |v| v.session.requested_at))
    }

    async fn update_session_status(
        &self,
        session_id: &SessionId,
        from: SessionStatus,
        to: SessionStatus,
        now: DateTime<Utc>,
    ) -> ExchangeResult<Option<Session>> {
        let mut state = self.state();
        let Some(session) = state
            .sessions
            .iter_mut()
            .find(|s| &s.session_id == session_id && s.status == from)
        else {
            return Ok(None);
        };

        session.status = to;
        session.updated_at = now;
        Ok(Some(session.clone()))
    }

    async fn complete_session(
        &self,
        session_id: &SessionId,
        terms: &CreditTerms,
        now: DateTime<Utc>,
    ) -> ExchangeResult<Session> {
        let mut state = self.state();
        let session = state
            .sessions
            .iter()
            .find(|s| &s.session_id == session_id)
            .cloned()
            .ok_or(ExchangeError::SessionNotFound)?;

        if session.status == SessionStatus::Completed {
            return Err(ExchangeError::StaleSession);
        }
        if session.status != SessionStatus::Accepted {
            return Err(ExchangeError::InvalidTransition {
                from: session.status,
                to: SessionStatus::Completed,
            });
        }

        let (learner, teacher) = (session.learner_id, session.teacher_id);
        state.open_account(&learner, terms, now);
        state.open_account(&teacher, terms, now);

        // Checked before expiring so a refusal leaves the ledger untouched
        let due: i64 = state
            .ledger
            .iter()
            .filter(|tx| tx.user_id == learner && tx.is_due_at(now))
            .map(|tx| tx.amount)
            .sum();
        let balance = state.accounts.get(&learner).copied().unwrap_or_default() - due;
        if balance < terms.learn_cost {
            return Err(ExchangeError::InsufficientCredits {
                balance,
                required: terms.learn_cost,
            });
        }
        state.expire_user(&learner, now);

        state.append(CreditTransaction::spend(
            learner,
            terms.learn_cost,
            format!("Learned {}", session.skill_name),
            Some(session.session_id),
            now,
        ));
        state.append(CreditTransaction::earn(
            teacher,
            terms.teach_reward,
            format!("Taught {}", session.skill_name),
            Some(session.session_id),
            now,
            terms.earn_lifetime,
        ));

        let stored = state
            .sessions
            .iter_mut()
            .find(|s| &s.session_id == session_id)
            .ok_or(ExchangeError::SessionNotFound)?;
        stored.status = SessionStatus::Completed;
        stored.completed_at = Some(now);
        stored.updated_at = now;

        Ok(stored.clone())
    }
}

impl LedgerRepository for MemoryStore {
    async fn open_account(
        &self,
        user_id: &UserId,
        terms: &CreditTerms,
        now: DateTime<Utc>,
    ) -> ExchangeResult<i64> {
        let mut state = self.state();
        state.ensure_user(user_id)?;
        state.open_account(user_id, terms, now);
        state.expire_user(user_id, now);
        Ok(state.accounts.get(user_id).copied().unwrap_or_default())
    }

    async fn expire_all_credits(&self, now: DateTime<Utc>) -> ExchangeResult<ExpirySweep> {
        let mut state = self.state();
        let users: Vec<UserId> = state.accounts.keys().copied().collect();

        let mut sweep = ExpirySweep::default();
        for user_id in users {
            let (count, _) = state.expire_user(&user_id, now);
            if count > 0 {
                sweep.transactions += count;
                sweep.users += 1;
            }
        }
        Ok(sweep)
    }

    async fn credit_summary(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
        soon_until: DateTime<Utc>,
    ) -> ExchangeResult<BalanceSummary> {
        let state = self.state();
        let ledger: Vec<CreditTransaction> = state
            .ledger
            .iter()
            .filter(|tx| &tx.user_id == user_id)
            .cloned()
            .collect();
        Ok(BalanceSummary::from_transactions(&ledger, now, soon_until))
    }

    async fn expiring_credits(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> ExchangeResult<Vec<CreditTransaction>> {
        let state = self.state();
        let mut expiring: Vec<CreditTransaction> = state
            .ledger
            .iter()
            .filter(|tx| &tx.user_id == user_id && tx.expires_between(now, until))
            .cloned()
            .collect();
        expiring.sort_by_key(|tx| tx.expires_at);
        Ok(expiring)
    }

    async fn credit_history(
        &self,
        user_id: &UserId,
        page: &Page,
    ) -> ExchangeResult<(Vec<CreditTransaction>, i64)> {
        let state = self.state();
        let all = newest_first(
            state.ledger.iter().filter(|tx| &tx.user_id == user_id).cloned(),
            |tx| tx.created_at,
        );
        let total = all.len() as i64;
        let rows = all
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok((rows, total))
    }
}

impl ReviewRepository for MemoryStore {
    async fn insert_review(&self, review: &Review) -> ExchangeResult<()> {
        let mut state = self.state();
        if state
            .reviews
            .iter()
            .any(|r| r.session_id == review.session_id && r.reviewer_id == review.reviewer_id)
        {
            return Err(ExchangeError::ReviewAlreadySubmitted);
        }
        state.reviews.push(review.clone());
        Ok(())
    }

    async fn reviews_for(&self, target_id: &UserId) -> ExchangeResult<Vec<Review>> {
        let state = self.state();
        let reviews = state.reviews.iter().filter(|r| &r.target_id == target_id).cloned();
        Ok(newest_first(reviews, |r| r.created_at))
    }
}

impl MessageRepository for MemoryStore {
    async fn insert_message(&self, message: &Message) -> ExchangeResult<()> {
        let mut state = self.state();
        state.ensure_user(&message.sender_id)?;
        state.ensure_user(&message.receiver_id)?;
        state.messages.push(message.clone());
        Ok(())
    }

    async fn find_message(&self, message_id: &MessageId) -> ExchangeResult<Option<Message>> {
        Ok(self
            .state()
            .messages
            .iter()
            .find(|m| &m.message_id == message_id)
            .cloned())
    }

    async fn inbox(&self, user_id: &UserId) -> ExchangeResult<Vec<MessageView>> {
        let state = self.state();
        let views = state
            .messages
            .iter()
            .filter(|m| &m.receiver_id == user_id)
            .map(|m| state.message_view(m));
        Ok(newest_first(views, |v| v.message.created_at))
    }

    async fn unread_count(&self, user_id: &UserId) -> ExchangeResult<i64> {
        let state = self.state();
        Ok(state
            .messages
            .iter()
            .filter(|m| &m.receiver_id == user_id && !m.read)
            .count() as i64)
    }

    async fn conversation(
        &self,
        user_id: &UserId,
        other_id: &UserId,
    ) -> ExchangeResult<Vec<MessageView>> {
        let state = self.state();
        let mut views: Vec<MessageView> = state
            .messages
            .iter()
            .filter(|m| {
                (&m.sender_id == user_id && &m.receiver_id == other_id)
                    || (&m.sender_id == other_id && &m.receiver_id == user_id)
            })
            .map(|m| state.message_view(m))
            .collect();
        views.sort_by_key(|v| v.message.created_at);
        Ok(views)
    }

    async fn mark_message_read(&self, message_id: &MessageId) -> ExchangeResult<()> {
        let mut state = self.state();
        if let Some(message) = state.messages.iter_mut().find(|m| &m.message_id == message_id) {
            message.read = true;
        }
        Ok(())
    }
}

impl DemoRepository for MemoryStore {
    async fn reset_demo(
        &self,
        seed: &DemoSeed,
        terms: &CreditTerms,
        now: DateTime<Utc>,
    ) -> ExchangeResult<()> {
        let mut state = self.state();
        *state = State::default();

        for user in &seed.users {
            state.users.push(user.clone());
            state.open_account(&user.user_id, terms, now);
        }
        state.skills.extend(seed.skills.iter().cloned());

        Ok(())
    }
}
