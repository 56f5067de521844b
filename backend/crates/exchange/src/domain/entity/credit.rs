//! Credit Ledger Entities
//!
//! Every balance change is an immutable [`CreditTransaction`]. The cached
//! account balance only moves in the same store transaction as a ledger
//! append or an expiry flip, so at every commit
//! `balance == Σ active earn − Σ spend`.
//!
//! An earn is active iff `now < expires_at`. It counts as "expiring soon"
//! when `now < expires_at <= now + window`.

use chrono::{DateTime, Duration, Utc};

use crate::domain::value_object::{
    CreditTransactionId, SessionId, TransactionKind, TransactionStatus, UserId,
};

pub const SIGNUP_BONUS_REASON: &str = "Signup bonus";

/// Amounts and lifetimes of the credit economy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreditTerms {
    /// Granted once when the account is opened
    pub signup_bonus: i64,
    /// Paid by the learner when a session completes
    pub learn_cost: i64,
    /// Paid to the teacher when a session completes
    pub teach_reward: i64,
    /// Lifetime of every earn
    pub earn_lifetime: Duration,
    /// Horizon of the "expiring soon" view
    pub expiring_soon: Duration,
}

impl Default for CreditTerms {
    fn default() -> Self {
        Self {
            signup_bonus: 100,
            learn_cost: 5,
            teach_reward: 5,
            earn_lifetime: Duration::days(180),
            expiring_soon: Duration::days(30),
        }
    }
}

/// Ledger entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditTransaction {
    pub transaction_id: CreditTransactionId,
    pub user_id: UserId,
    /// Always positive; the direction is `kind`
    pub amount: i64,
    pub kind: TransactionKind,
    pub reason: String,
    pub session_id: Option<SessionId>,
    pub created_at: DateTime<Utc>,
    /// Set for earns only
    pub expires_at: Option<DateTime<Utc>>,
    pub status: TransactionStatus,
}

impl CreditTransaction {
    pub fn earn(
        user_id: UserId,
        amount: i64,
        reason: impl Into<String>,
        session_id: Option<SessionId>,
        now: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        Self {
            transaction_id: CreditTransactionId::new(),
            user_id,
            amount,
            kind: TransactionKind::Earn,
            reason: reason.into(),
            session_id,
            created_at: now,
            expires_at: Some(now + lifetime),
            status: TransactionStatus::Active,
        }
    }

    pub fn spend(
        user_id: UserId,
        amount: i64,
        reason: impl Into<String>,
        session_id: Option<SessionId>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            transaction_id: CreditTransactionId::new(),
            user_id,
            amount,
            kind: TransactionKind::Spend,
            reason: reason.into(),
            session_id,
            created_at: now,
            expires_at: None,
            status: TransactionStatus::Active,
        }
    }

    /// Counts toward the balance at `now`
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        match self.kind {
            TransactionKind::Spend => true,
            TransactionKind::Earn => {
                self.status == TransactionStatus::Active
                    && self.expires_at.is_some_and(|at| now < at)
            }
        }
    }

    /// An active earn whose expiry has passed but has not been flipped yet
    pub fn is_due_at(&self, now: DateTime<Utc>) -> bool {
        self.kind == TransactionKind::Earn
            && self.status == TransactionStatus::Active
            && self.expires_at.is_some_and(|at| at <= now)
    }

    /// Active at `now` and expiring no later than `until`
    pub fn expires_between(&self, now: DateTime<Utc>, until: DateTime<Utc>) -> bool {
        self.is_active_at(now)
            && self.kind == TransactionKind::Earn
            && self.expires_at.is_some_and(|at| at <= until)
    }

    /// Contribution to the balance
    pub fn signed_amount(&self) -> i64 {
        match self.kind {
            TransactionKind::Earn => self.amount,
            TransactionKind::Spend => -self.amount,
        }
    }
}

/// `GET /api/credits/balance`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BalanceSummary {
    pub balance: i64,
    pub active_earned: i64,
    pub spent: i64,
    pub expiring_soon: i64,
}

impl BalanceSummary {
    /// Derive the summary from the full ledger of one user
    pub fn from_transactions(
        transactions: &[CreditTransaction],
        now: DateTime<Utc>,
        soon_until: DateTime<Utc>,
    ) -> Self {
        let mut summary = Self::default();

        for tx in transactions.iter().filter(|tx| tx.is_active_at(now)) {
            match tx.kind {
                TransactionKind::Earn => summary.active_earned += tx.amount,
                TransactionKind::Spend => summary.spent += tx.amount,
            }
            if tx.expires_between(now, soon_until) {
                summary.expiring_soon += tx.amount;
            }
        }

        summary.balance = summary.active_earned - summary.spent;
        summary
    }
}

/// Result of an expiry pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpirySweep {
    /// Earns flipped to expired
    pub transactions: u64,
    /// Accounts whose balance was reduced
    pub users: u64,
}
