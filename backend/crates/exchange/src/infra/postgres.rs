//! PostgreSQL Repository Implementations
//!
//! Every write that touches a balance runs inside one transaction together
//! with the ledger rows it corresponds to. Account rows are always locked in
//! `user_id` order.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::domain::entity::{
    BalanceSummary, CreditTerms, CreditTransaction, ExpirySweep, Member, Message, MessageView,
    Review, SIGNUP_BONUS_REASON, Session, SessionView, Skill, SkillListing,
};
use crate::domain::repository::{
    DemoRepository, DemoSeed, LedgerRepository, MemberDirectory, MessageRepository,
    ReviewRepository, SessionRepository, SkillRepository,
};
use crate::domain::value_object::{
    CreditTransactionId, MessageId, MessageText, Page, Rating, ReviewId, ReviewText, SessionId,
    SessionStatus, SkillDescription, SkillId, SkillName, TransactionKind, TransactionStatus,
    UserId,
};
use crate::error::{ExchangeError, ExchangeResult};

/// PostgreSQL-backed exchange repository
#[derive(Clone)]
pub struct PgExchangeRepository {
    pool: PgPool,
}

impl PgExchangeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error().is_some_and(|db| db.is_unique_violation())
}

/// A row referencing a user that no longer exists (e.g. after a demo reset)
fn user_reference(e: sqlx::Error) -> ExchangeError {
    if e.as_database_error().is_some_and(|db| db.is_foreign_key_violation()) {
        ExchangeError::UserNotFound
    } else {
        ExchangeError::Database(e)
    }
}

// ============================================================================
// Skill Repository Implementation
// ============================================================================

async fn insert_skill_in(conn: &mut PgConnection, skill: &Skill) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO skills (
            skill_id,
            teacher_id,
            name,
            name_canonical,
            description,
            created_at
        ) VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(skill.skill_id.as_uuid())
    .bind(skill.teacher_id.as_uuid())
    .bind(skill.name.as_str())
    .bind(skill.name.canonical())
    .bind(skill.description.as_str())
    .bind(skill.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

impl SkillRepository for PgExchangeRepository {
    async fn insert_skill(&self, skill: &Skill) -> ExchangeResult<()> {
        let mut conn = self.pool.acquire().await?;
        insert_skill_in(&mut conn, skill).await.map_err(|e| {
            if is_unique_violation(&e) {
                ExchangeError::SkillNameTaken
            } else {
                user_reference(e)
            }
        })
    }

    async fn find_skill(&self, skill_id: &SkillId) -> ExchangeResult<Option<Skill>> {
        let row = sqlx::query_as::<_, SkillRow>(
            r#"
            SELECT
                skill_id,
                teacher_id,
                name,
                name_canonical,
                description,
                created_at
            FROM skills
            WHERE skill_id = $1
            "#,
        )
        .bind(skill_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SkillRow::into_skill))
    }

    async fn list_skills(&self) -> ExchangeResult<Vec<SkillListing>> {
        let rows = sqlx::query_as::<_, SkillListingRow>(
            r#"
            SELECT
                s.skill_id,
                s.teacher_id,
                s.name,
                s.name_canonical,
                s.description,
                s.created_at,
                u.display_name AS teacher_name,
                u.email AS teacher_email
            FROM skills s
            JOIN users u ON u.user_id = s.teacher_id
            ORDER BY s.created_at DESC, s.skill_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SkillListingRow::into_listing).collect())
    }

    async fn list_user_skills(&self, teacher_id: &UserId) -> ExchangeResult<Vec<Skill>> {
        let rows = sqlx::query_as::<_, SkillRow>(
            r#"
            SELECT
                skill_id,
                teacher_id,
                name,
                name_canonical,
                description,
                created_at
            FROM skills
            WHERE teacher_id = $1
            ORDER BY created_at DESC, skill_id
            "#,
        )
        .bind(teacher_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SkillRow::into_skill).collect())
    }

    async fn delete_skill(&self, teacher_id: &UserId, skill_id: &SkillId) -> ExchangeResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM skills
            WHERE skill_id = $1 AND teacher_id = $2
            "#,
        )
        .bind(skill_id.as_uuid())
        .bind(teacher_id.as_uuid())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// Member Directory Implementation
// ============================================================================

impl MemberDirectory for PgExchangeRepository {
    async fn find_member(&self, user_id: &UserId) -> ExchangeResult<Option<Member>> {
        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT user_id, display_name, email
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(MemberRow::into_member))
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for PgExchangeRepository {
    async fn insert_session(&self, session: &Session) -> ExchangeResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (
                session_id,
                skill_id,
                skill_name,
                teacher_id,
                learner_id,
                status,
                requested_at,
                completed_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(session.session_id.as_uuid())
        .bind(session.skill_id.map(SkillId::into_uuid))
        .bind(&session.skill_name)
        .bind(session.teacher_id.as_uuid())
        .bind(session.learner_id.as_uuid())
        .bind(session.status.id())
        .bind(session.requested_at)
        .bind(session.completed_at)
        .bind(session.updated_at)
        .execute(&self.pool)
        .await
        .map_err(user_reference)?;

        Ok(())
    }

    async fn find_session(&self, session_id: &SessionId) -> ExchangeResult<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT
                session_id,
                skill_id,
                skill_name,
                teacher_id,
                learner_id,
                status,
                requested_at,
                completed_at,
                updated_at
            FROM sessions
            WHERE session_id = $1
            "#,
        )
        .bind(session_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(SessionRow::into_session).transpose()
    }

    async fn list_sessions_for(&self, user_id: &UserId) -> ExchangeResult<Vec<SessionView>> {
        let rows = sqlx::query_as::<_, SessionViewRow>(
            r#"
            SELECT
                s.session_id,
                s.skill_id,
                s.skill_name,
                s.teacher_id,
                s.learner_id,
                s.status,
                s.requested_at,
                s.completed_at,
                s.updated_at,
                t.display_name AS teacher_name,
                l.display_name AS learner_name
            FROM sessions s
            JOIN users t ON t.user_id = s.teacher_id
            JOIN users l ON l.user_id = s.learner_id
            WHERE s.teacher_id = $1 OR s.learner_id = $1
            ORDER BY s.requested_at DESC, s.session_id
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SessionViewRow::into_view).collect()
    }

    async fn update_session_status(
        &self,
        session_id: &SessionId,
        from: SessionStatus,
        to: SessionStatus,
        now: DateTime<Utc>,
    ) -> ExchangeResult<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            UPDATE sessions
            SET status = $3, updated_at = $4
            WHERE session_id = $1 AND status = $2
            RETURNING
                session_id,
                skill_id,
                skill_name,
                teacher_id,
                learner_id,
                status,
                requested_at,
                completed_at,
                updated_at
            "#,
        )
        .bind(session_id.as_uuid())
        .bind(from.id())
        .bind(to.id())
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        row.map(SessionRow::into_session).transpose()
    }

    async fn complete_session(
        &self,
        session_id: &SessionId,
        terms: &CreditTerms,
        now: DateTime<Utc>,
    ) -> ExchangeResult<Session> {
        let mut tx = self.pool.begin().await?;

        let session = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT
                session_id,
                skill_id,
                skill_name,
                teacher_id,
                learner_id,
                status,
                requested_at,
                completed_at,
                updated_at
            FROM sessions
            WHERE session_id = $1
            FOR UPDATE
            "#,
        )
        .bind(session_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ExchangeError::SessionNotFound)?
        .into_session()?;

        // A concurrent completion committed while we waited for the lock
        if session.status == SessionStatus::Completed {
            return Err(ExchangeError::StaleSession);
        }
        if session.status != SessionStatus::Accepted {
            return Err(ExchangeError::InvalidTransition {
                from: session.status,
                to: SessionStatus::Completed,
            });
        }

        let learner = session.learner_id;
        let teacher = session.teacher_id;

        open_account_in(&mut tx, &learner, terms, now).await?;
        open_account_in(&mut tx, &teacher, terms, now).await?;

        lock_accounts_in(&mut tx, &[learner, teacher]).await?;

        expire_user_in(&mut tx, &learner, now).await?;
        let balance = balance_in(&mut tx, &learner).await?;
        if balance < terms.learn_cost {
            // Dropping `tx` rolls back the lazy expiry as well
            return Err(ExchangeError::InsufficientCredits {
                balance,
                required: terms.learn_cost,
            });
        }

        let spend = CreditTransaction::spend(
            learner,
            terms.learn_cost,
            format!("Learned {}", session.skill_name),
            Some(session.session_id),
            now,
        );
        let earn = CreditTransaction::earn(
            teacher,
            terms.teach_reward,
            format!("Taught {}", session.skill_name),
            Some(session.session_id),
            now,
            terms.earn_lifetime,
        );

        for entry in [&spend, &earn] {
            insert_transaction_in(&mut tx, entry).await?;
            adjust_balance_in(&mut tx, &entry.user_id, entry.signed_amount()).await?;
        }

        let completed = sqlx::query_as::<_, SessionRow>(
            r#"
            UPDATE sessions
            SET status = $2, completed_at = $3, updated_at = $3
            WHERE session_id = $1
            RETURNING
                session_id,
                skill_id,
                skill_name,
                teacher_id,
                learner_id,
                status,
                requested_at,
                completed_at,
                updated_at
            "#,
        )
        .bind(session_id.as_uuid())
        .bind(SessionStatus::Completed.id())
        .bind(now)
        .fetch_one(&mut *tx)
        .await?
        .into_session()?;

        tx.commit().await?;

        Ok(completed)
    }
}

// ============================================================================
// Ledger Repository Implementation
// ============================================================================

/// Open the account with the signup bonus if it does not exist yet
async fn open_account_in(
    conn: &mut PgConnection,
    user_id: &UserId,
    terms: &CreditTerms,
    now: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let inserted = sqlx::query(
        r#"
        INSERT INTO credit_accounts (user_id, balance, opened_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id) DO NOTHING
        "#,
    )
    .bind(user_id.as_uuid())
    .bind(terms.signup_bonus)
    .bind(now)
    .execute(&mut *conn)
    .await?
    .rows_affected()
        > 0;

    if inserted {
        let bonus = CreditTransaction::earn(
            *user_id,
            terms.signup_bonus,
            SIGNUP_BONUS_REASON,
            None,
            now,
            terms.earn_lifetime,
        );
        insert_transaction_in(conn, &bonus).await?;
    }

    Ok(inserted)
}

async fn insert_transaction_in(
    conn: &mut PgConnection,
    entry: &CreditTransaction,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO credit_transactions (
            transaction_id,
            user_id,
            amount,
            kind,
            reason,
            session_id,
            created_at,
            expires_at,
            status
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(entry.transaction_id.as_uuid())
    .bind(entry.user_id.as_uuid())
    .bind(entry.amount)
    .bind(entry.kind.id())
    .bind(&entry.reason)
    .bind(entry.session_id.map(SessionId::into_uuid))
    .bind(entry.created_at)
    .bind(entry.expires_at)
    .bind(entry.status.id())
    .execute(conn)
    .await?;

    Ok(())
}

async fn adjust_balance_in(
    conn: &mut PgConnection,
    user_id: &UserId,
    delta: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE credit_accounts
        SET balance = balance + $2
        WHERE user_id = $1
        "#,
    )
    .bind(user_id.as_uuid())
    .bind(delta)
    .execute(conn)
    .await?;

    Ok(())
}

async fn balance_in(conn: &mut PgConnection, user_id: &UserId) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT balance FROM credit_accounts WHERE user_id = $1")
        .bind(user_id.as_uuid())
        .fetch_one(conn)
        .await
}

/// Row-lock accounts in `user_id` order
///
/// Every ledger write takes the account locks before touching the user's
/// transactions, so completions, lazy expiry and the sweep cannot deadlock.
async fn lock_accounts_in(conn: &mut PgConnection, users: &[UserId]) -> Result<(), sqlx::Error> {
    let ids: Vec<Uuid> = users.iter().map(|u| u.into_uuid()).collect();
    sqlx::query(
        r#"
        SELECT user_id
        FROM credit_accounts
        WHERE user_id = ANY($1)
        ORDER BY user_id
        FOR UPDATE
        "#,
    )
    .bind(ids)
    .execute(conn)
    .await?;

    Ok(())
}

/// Flip the user's due earns to expired and take them off the balance
///
/// The caller holds the account lock.
async fn expire_user_in(
    conn: &mut PgConnection,
    user_id: &UserId,
    now: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let expired = sqlx::query_scalar::<_, i64>(
        r#"
        WITH expired AS (
            UPDATE credit_transactions
            SET status = $3
            WHERE user_id = $1
              AND kind = $4
              AND status = $5
              AND expires_at <= $2
            RETURNING amount
        )
        UPDATE credit_accounts
        SET balance = balance - (SELECT COALESCE(SUM(amount), 0) FROM expired)
        WHERE user_id = $1
          AND EXISTS (SELECT 1 FROM expired)
        RETURNING (SELECT COUNT(*) FROM expired)
        "#,
    )
    .bind(user_id.as_uuid())
    .bind(now)
    .bind(TransactionStatus::Expired.id())
    .bind(TransactionKind::Earn.id())
    .bind(TransactionStatus::Active.id())
    .fetch_optional(conn)
    .await?;

    Ok(expired.map_or(0, |n| n as u64))
}

impl LedgerRepository for PgExchangeRepository {
    async fn open_account(
        &self,
        user_id: &UserId,
        terms: &CreditTerms,
        now: DateTime<Utc>,
    ) -> ExchangeResult<i64> {
        let mut tx = self.pool.begin().await?;

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE user_id = $1)",
        )
        .bind(user_id.as_uuid())
        .fetch_one(&mut *tx)
        .await?;
        if !exists {
            return Err(ExchangeError::UserNotFound);
        }

        if open_account_in(&mut tx, user_id, terms, now).await? {
            tracing::info!(user_id = %user_id, bonus = terms.signup_bonus, "Credit account opened");
        }
        lock_accounts_in(&mut tx, &[*user_id]).await?;
        expire_user_in(&mut tx, user_id, now).await?;
        let balance = balance_in(&mut tx, user_id).await?;

        tx.commit().await?;

        Ok(balance)
    }

    async fn expire_all_credits(&self, now: DateTime<Utc>) -> ExchangeResult<ExpirySweep> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            SELECT user_id
            FROM credit_accounts
            WHERE user_id IN (
                SELECT user_id
                FROM credit_transactions
                WHERE kind = $1 AND status = $2 AND expires_at <= $3
            )
            ORDER BY user_id
            FOR UPDATE
            "#,
        )
        .bind(TransactionKind::Earn.id())
        .bind(TransactionStatus::Active.id())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let counts = sqlx::query_scalar::<_, i64>(
            r#"
            WITH expired AS (
                UPDATE credit_transactions
                SET status = $2
                WHERE kind = $3
                  AND status = $4
                  AND expires_at <= $1
                RETURNING user_id, amount
            ),
            totals AS (
                SELECT user_id, SUM(amount)::BIGINT AS total, COUNT(*) AS n
                FROM expired
                GROUP BY user_id
            )
            UPDATE credit_accounts a
            SET balance = a.balance - t.total
            FROM totals t
            WHERE a.user_id = t.user_id
            RETURNING t.n
            "#,
        )
        .bind(now)
        .bind(TransactionStatus::Expired.id())
        .bind(TransactionKind::Earn.id())
        .bind(TransactionStatus::Active.id())
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(ExpirySweep {
            transactions: counts.iter().map(|n| *n as u64).sum(),
            users: counts.len() as u64,
        })
    }

    async fn credit_summary(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
        soon_until: DateTime<Utc>,
    ) -> ExchangeResult<BalanceSummary> {
        let (active_earned, spent, expiring_soon) = sqlx::query_as::<_, (i64, i64, i64)>(
            r#"
            SELECT
                COALESCE(SUM(amount) FILTER (
                    WHERE kind = $4 AND status = $5 AND expires_at > $2
                ), 0)::BIGINT,
                COALESCE(SUM(amount) FILTER (WHERE kind = $6), 0)::BIGINT,
                COALESCE(SUM(amount) FILTER (
                    WHERE kind = $4 AND status = $5 AND expires_at > $2 AND expires_at <= $3
                ), 0)::BIGINT
            FROM credit_transactions
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(now)
        .bind(soon_until)
        .bind(TransactionKind::Earn.id())
        .bind(TransactionStatus::Active.id())
        .bind(TransactionKind::Spend.id())
        .fetch_one(&self.pool)
        .await?;

        Ok(BalanceSummary {
            balance: active_earned - spent,
            active_earned,
            spent,
            expiring_soon,
        })
    }

    async fn expiring_credits(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> ExchangeResult<Vec<CreditTransaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT
                transaction_id,
                user_id,
                amount,
                kind,
                reason,
                session_id,
                created_at,
                expires_at,
                status
            FROM credit_transactions
            WHERE user_id = $1
              AND kind = $4
              AND status = $5
              AND expires_at > $2
              AND expires_at <= $3
            ORDER BY expires_at ASC, transaction_id
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(now)
        .bind(until)
        .bind(TransactionKind::Earn.id())
        .bind(TransactionStatus::Active.id())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TransactionRow::into_transaction).collect()
    }

    async fn credit_history(
        &self,
        user_id: &UserId,
        page: &Page,
    ) -> ExchangeResult<(Vec<CreditTransaction>, i64)> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT
                transaction_id,
                user_id,
                amount,
                kind,
                reason,
                session_id,
                created_at,
                expires_at,
                status
            FROM credit_transactions
            WHERE user_id = $1
            ORDER BY created_at DESC, transaction_id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(i64::from(page.limit()))
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM credit_transactions WHERE user_id = $1",
        )
        .bind(user_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        let transactions = rows
            .into_iter()
            .map(TransactionRow::into_transaction)
            .collect::<ExchangeResult<Vec<_>>>()?;

        Ok((transactions, total))
    }
}

// ============================================================================
// Review Repository Implementation
// ============================================================================

impl ReviewRepository for PgExchangeRepository {
    async fn insert_review(&self, review: &Review) -> ExchangeResult<()> {
        sqlx::query(
            r#"
            INSERT INTO reviews (
                review_id,
                session_id,
                reviewer_id,
                target_id,
                rating,
                text,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(review.review_id.as_uuid())
        .bind(review.session_id.as_uuid())
        .bind(review.reviewer_id.as_uuid())
        .bind(review.target_id.as_uuid())
        .bind(review.rating.value())
        .bind(review.text.as_ref().map(ReviewText::as_str))
        .bind(review.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ExchangeError::ReviewAlreadySubmitted
            } else {
                ExchangeError::Database(e)
            }
        })?;

        Ok(())
    }

    async fn reviews_for(&self, target_id: &UserId) -> ExchangeResult<Vec<Review>> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            r#"
            SELECT
                review_id,
                session_id,
                reviewer_id,
                target_id,
                rating,
                text,
                created_at
            FROM reviews
            WHERE target_id = $1
            ORDER BY created_at DESC, review_id
            "#,
        )
        .bind(target_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ReviewRow::into_review).collect())
    }
}

// ============================================================================
// Message Repository Implementation
// ============================================================================

impl MessageRepository for PgExchangeRepository {
    async fn insert_message(&self, message: &Message) -> ExchangeResult<()> {
        sqlx::query(
            r#"
            INSERT INTO messages (
                message_id,
                sender_id,
                receiver_id,
                text,
                created_at,
                read
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(message.message_id.as_uuid())
        .bind(message.sender_id.as_uuid())
        .bind(message.receiver_id.as_uuid())
        .bind(message.text.as_str())
        .bind(message.created_at)
        .bind(message.read)
        .execute(&self.pool)
        .await
        .map_err(user_reference)?;

        Ok(())
    }

    async fn find_message(&self, message_id: &MessageId) -> ExchangeResult<Option<Message>> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT message_id, sender_id, receiver_id, text, created_at, read
            FROM messages
            WHERE message_id = $1
            "#,
        )
        .bind(message_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(MessageRow::into_message))
    }

    async fn inbox(&self, user_id: &UserId) -> ExchangeResult<Vec<MessageView>> {
        let rows = sqlx::query_as::<_, MessageViewRow>(
            r#"
            SELECT
                m.message_id,
                m.sender_id,
                m.receiver_id,
                m.text,
                m.created_at,
                m.read,
                s.display_name AS sender_name,
                r.display_name AS receiver_name
            FROM messages m
            JOIN users s ON s.user_id = m.sender_id
            JOIN users r ON r.user_id = m.receiver_id
            WHERE m.receiver_id = $1
            ORDER BY m.created_at DESC, m.message_id
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MessageViewRow::into_view).collect())
    }

    async fn unread_count(&self, user_id: &UserId) -> ExchangeResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM messages WHERE receiver_id = $1 AND NOT read",
        )
        .bind(user_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn conversation(
        &self,
        user_id: &UserId,
        other_id: &UserId,
    ) -> ExchangeResult<Vec<MessageView>> {
        let rows = sqlx::query_as::<_, MessageViewRow>(
            r#"
            SELECT
                m.message_id,
                m.sender_id,
                m.receiver_id,
                m.text,
                m.created_at,
                m.read,
                s.display_name AS sender_name,
                r.display_name AS receiver_name
            FROM messages m
            JOIN users s ON s.user_id = m.sender_id
            JOIN users r ON r.user_id = m.receiver_id
            WHERE (m.sender_id = $1 AND m.receiver_id = $2)
               OR (m.sender_id = $2 AND m.receiver_id = $1)
            ORDER BY m.created_at ASC, m.message_id
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(other_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MessageViewRow::into_view).collect())
    }

    async fn mark_message_read(&self, message_id: &MessageId) -> ExchangeResult<()> {
        sqlx::query("UPDATE messages SET read = TRUE WHERE message_id = $1")
            .bind(message_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// ============================================================================
// Demo Repository Implementation
// ============================================================================

impl DemoRepository for PgExchangeRepository {
    async fn reset_demo(
        &self,
        seed: &DemoSeed,
        terms: &CreditTerms,
        now: DateTime<Utc>,
    ) -> ExchangeResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            TRUNCATE messages, reviews, credit_transactions, sessions, skills, credit_accounts, users
            "#,
        )
        .execute(&mut *tx)
        .await?;

        for user in &seed.users {
            auth::insert_user(&mut *tx, user).await?;
            open_account_in(&mut tx, &user.user_id, terms, now).await?;
        }
        for skill in &seed.skills {
            insert_skill_in(&mut tx, skill).await?;
        }

        tx.commit().await?;

        Ok(())
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct MemberRow {
    user_id: Uuid,
    display_name: String,
    email: String,
}

impl MemberRow {
    fn into_member(self) -> Member {
        Member {
            user_id: UserId::from_uuid(self.user_id),
            name: self.display_name,
            email: self.email,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SkillRow {
    skill_id: Uuid,
    teacher_id: Uuid,
    name: String,
    name_canonical: String,
    description: String,
    created_at: DateTime<Utc>,
}

impl SkillRow {
    fn into_skill(self) -> Skill {
        Skill {
            skill_id: SkillId::from_uuid(self.skill_id),
            teacher_id: UserId::from_uuid(self.teacher_id),
            name: SkillName::from_db(self.name, self.name_canonical),
            description: SkillDescription::from_db(self.description),
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SkillListingRow {
    #[sqlx(flatten)]
    skill: SkillRow,
    teacher_name: String,
    teacher_email: String,
}

impl SkillListingRow {
    fn into_listing(self) -> SkillListing {
        SkillListing {
            skill: self.skill.into_skill(),
            teacher_name: self.teacher_name,
            teacher_email: self.teacher_email,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    session_id: Uuid,
    skill_id: Option<Uuid>,
    skill_name: String,
    teacher_id: Uuid,
    learner_id: Uuid,
    status: i16,
    requested_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

impl SessionRow {
    fn into_session(self) -> ExchangeResult<Session> {
        let status = SessionStatus::from_id(self.status).ok_or_else(|| {
            ExchangeError::Internal(format!("Unknown session status {}", self.status))
        })?;

        Ok(Session {
            session_id: SessionId::from_uuid(self.session_id),
            skill_id: self.skill_id.map(SkillId::from_uuid),
            skill_name: self.skill_name,
            teacher_id: UserId::from_uuid(self.teacher_id),
            learner_id: UserId::from_uuid(self.learner_id),
            status,
            requested_at: self.requested_at,
            completed_at: self.completed_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SessionViewRow {
    #[sqlx(flatten)]
    session: SessionRow,
    teacher_name: String,
    learner_name: String,
}

impl SessionViewRow {
    fn into_view(self) -> ExchangeResult<SessionView> {
        Ok(SessionView {
            session: self.session.into_session()?,
            teacher_name: self.teacher_name,
            learner_name: self.learner_name,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TransactionRow {
    transaction_id: Uuid,
    user_id: Uuid,
    amount: i64,
    kind: i16,
    reason: String,
    session_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    status: i16,
}

impl TransactionRow {
    fn into_transaction(self) -> ExchangeResult<CreditTransaction> {
        let kind = TransactionKind::from_id(self.kind).ok_or_else(|| {
            ExchangeError::Internal(format!("Unknown transaction kind {}", self.kind))
        })?;
        let status = TransactionStatus::from_id(self.status).ok_or_else(|| {
            ExchangeError::Internal(format!("Unknown transaction status {}", self.status))
        })?;

        Ok(CreditTransaction {
            transaction_id: CreditTransactionId::from_uuid(self.transaction_id),
            user_id: UserId::from_uuid(self.user_id),
            amount: self.amount,
            kind,
            reason: self.reason,
            session_id: self.session_id.map(SessionId::from_uuid),
            created_at: self.created_at,
            expires_at: self.expires_at,
            status,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    review_id: Uuid,
    session_id: Uuid,
    reviewer_id: Uuid,
    target_id: Uuid,
    rating: i16,
    text: Option<String>,
    created_at: DateTime<Utc>,
}

impl ReviewRow {
    fn into_review(self) -> Review {
        Review {
            review_id: ReviewId::from_uuid(self.review_id),
            session_id: SessionId::from_uuid(self.session_id),
            reviewer_id: UserId::from_uuid(self.reviewer_id),
            target_id: UserId::from_uuid(self.target_id),
            rating: Rating::from_db(self.rating),
            text: self.text.map(ReviewText::from_db),
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    message_id: Uuid,
    sender_id: Uuid,
    receiver_id: Uuid,
    text: String,
    created_at: DateTime<Utc>,
    read: bool,
}

impl MessageRow {
    fn into_message(self) -> Message {
        Message {
            message_id: MessageId::from_uuid(self.message_id),
            sender_id: UserId::from_uuid(self.sender_id),
            receiver_id: UserId::from_uuid(self.receiver_id),
            text: MessageText::from_db(self.text),
            created_at: self.created_at,
            read: self.read,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MessageViewRow {
    #[sqlx(flatten)]
    message: MessageRow,
    sender_name: String,
    receiver_name: String,
}

impl MessageViewRow {
    fn into_view(self) -> MessageView {
        MessageView {
            message: self.message.into_message(),
            sender_name: self.sender_name,
            receiver_name: self.receiver_name,
        }
    }
}
