//! API DTOs (Data Transfer Objects)
//!
//! Ids in request bodies arrive as strings and are parsed by the handlers,
//! so a missing or malformed id is a 400 with a readable message rather
//! than a JSON rejection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::DemoSummary;
use crate::domain::entity::{
    AnonymousReview, BalanceSummary, CreditTransaction, ExpirySweep, Message, MessageView,
    ReviewSummary, Session, SessionView, Skill, SkillListing,
};
use crate::domain::value_object::{
    CreditTransactionId, MessageId, SessionId, SkillId, UserId,
};

// ============================================================================
// Skills
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddSkillRequest {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillResponse {
    pub id: SkillId,
    pub teacher_id: UserId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl From<Skill> for SkillResponse {
    fn from(skill: Skill) -> Self {
        Self {
            id: skill.skill_id,
            teacher_id: skill.teacher_id,
            name: skill.name.as_str().to_string(),
            description: skill.description.as_str().to_string(),
            created_at: skill.created_at,
        }
    }
}

/// Directory entry with the teacher's public details
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillListingResponse {
    #[serde(flatten)]
    pub skill: SkillResponse,
    pub teacher_name: String,
    pub teacher_email: String,
}

impl From<SkillListing> for SkillListingResponse {
    fn from(listing: SkillListing) -> Self {
        Self {
            skill: listing.skill.into(),
            teacher_name: listing.teacher_name,
            teacher_email: listing.teacher_email,
        }
    }
}

// ============================================================================
// Sessions
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestSessionRequest {
    pub skill_id: Option<String>,
    pub teacher_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateSessionRequest {
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: SessionId,
    pub skill_id: Option<SkillId>,
    pub skill_name: String,
    pub teacher_id: UserId,
    pub learner_id: UserId,
    pub status: &'static str,
    pub requested_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learner_name: Option<String>,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            id: session.session_id,
            skill_id: session.skill_id,
            skill_name: session.skill_name,
            teacher_id: session.teacher_id,
            learner_id: session.learner_id,
            status: session.status.code(),
            requested_at: session.requested_at,
            completed_at: session.completed_at,
            updated_at: session.updated_at,
            teacher_name: None,
            learner_name: None,
        }
    }
}

impl From<SessionView> for SessionResponse {
    fn from(view: SessionView) -> Self {
        Self {
            teacher_name: Some(view.teacher_name),
            learner_name: Some(view.learner_name),
            ..view.session.into()
        }
    }
}

// ============================================================================
// Credits
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub balance: i64,
    pub active_earned: i64,
    pub spent: i64,
    pub expiring_soon: i64,
}

impl From<BalanceSummary> for BalanceResponse {
    fn from(summary: BalanceSummary) -> Self {
        Self {
            balance: summary.balance,
            active_earned: summary.active_earned,
            spent: summary.spent,
            expiring_soon: summary.expiring_soon,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub id: CreditTransactionId,
    pub amount: i64,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub reason: String,
    pub session_id: Option<SessionId>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub status: &'static str,
}

impl From<CreditTransaction> for TransactionResponse {
    fn from(tx: CreditTransaction) -> Self {
        Self {
            id: tx.transaction_id,
            amount: tx.amount,
            kind: tx.kind.code(),
            reason: tx.reason,
            session_id: tx.session_id,
            created_at: tx.created_at,
            expires_at: tx.expires_at,
            status: tx.status.code(),
        }
    }
}

/// `?page=&limit=`; parsed by the handler so bad numbers are a JSON 400
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HistoryQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub transactions: Vec<TransactionResponse>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiringResponse {
    pub transactions: Vec<TransactionResponse>,
    pub total_amount: i64,
}

impl From<Vec<CreditTransaction>> for ExpiringResponse {
    fn from(transactions: Vec<CreditTransaction>) -> Self {
        Self {
            total_amount: transactions.iter().map(|tx| tx.amount).sum(),
            transactions: transactions.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpireResponse {
    pub expired_transactions: u64,
    pub affected_users: u64,
}

impl From<ExpirySweep> for ExpireResponse {
    fn from(sweep: ExpirySweep) -> Self {
        Self {
            expired_transactions: sweep.transactions,
            affected_users: sweep.users,
        }
    }
}

// ============================================================================
// Reviews
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmitReviewRequest {
    pub rating: Option<i64>,
    pub text: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewsResponse {
    pub reviews: Vec<AnonymousReview>,
    pub total_reviews: usize,
    /// `"4.0"`, or `null` without reviews
    pub average_rating: Option<String>,
}

impl ReviewsResponse {
    pub fn new(reviews: Vec<AnonymousReview>, summary: ReviewSummary) -> Self {
        Self {
            reviews,
            total_reviews: summary.total,
            average_rating: summary.average,
        }
    }
}

// ============================================================================
// Messages
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SendMessageRequest {
    pub receiver_id: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: MessageId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver_name: Option<String>,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.message_id,
            sender_id: message.sender_id,
            receiver_id: message.receiver_id,
            text: message.text.as_str().to_string(),
            created_at: message.created_at,
            read: message.read,
            sender_name: None,
            receiver_name: None,
        }
    }
}

impl From<MessageView> for MessageResponse {
    fn from(view: MessageView) -> Self {
        Self {
            sender_name: Some(view.sender_name),
            receiver_name: Some(view.receiver_name),
            ..view.message.into()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxResponse {
    pub messages: Vec<MessageResponse>,
    pub unread_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub messages: Vec<MessageResponse>,
}

// ============================================================================
// Demo
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetDemoResponse {
    pub message: &'static str,
    pub users: usize,
    pub skills: usize,
}

impl From<DemoSummary> for ResetDemoResponse {
    fn from(summary: DemoSummary) -> Self {
        Self {
            message: "Demo data reset",
            users: summary.users,
            skills: summary.skills,
        }
    }
}
