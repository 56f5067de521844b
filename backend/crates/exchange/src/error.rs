//! Exchange Error Types
//!
//! Exchange-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::value_object::SessionStatus;

/// Exchange-specific result type alias
pub type ExchangeResult<T> = Result<T, ExchangeError>;

/// Exchange-specific error variants
#[derive(Debug, Error)]
pub enum ExchangeError {
    // ------------------------------------------------------------------
    // 404
    // ------------------------------------------------------------------
    #[error("User not found")]
    UserNotFound,

    #[error("Skill not found")]
    SkillNotFound,

    #[error("Session not found")]
    SessionNotFound,

    #[error("Message not found")]
    MessageNotFound,

    // ------------------------------------------------------------------
    // 403
    // ------------------------------------------------------------------
    /// Acting on another user's skill list
    #[error("You can only manage your own skills")]
    NotOwner,

    #[error("You are not a participant in this session")]
    NotParticipant,

    #[error("Only the teacher can accept or reject a session")]
    OnlyTeacher,

    #[error("Only the receiver can mark a message as read")]
    NotReceiver,

    #[error("Invalid demo key")]
    InvalidDemoKey,

    // ------------------------------------------------------------------
    // 400
    // ------------------------------------------------------------------
    #[error("You cannot request a session for your own skill")]
    SelfRequest,

    #[error("Teacher does not match the skill listing")]
    TeacherMismatch,

    #[error("Only completed sessions can be reviewed")]
    SessionNotCompleted,

    #[error("You cannot message yourself")]
    SelfMessage,

    // ------------------------------------------------------------------
    // 409
    // ------------------------------------------------------------------
    #[error("You already list a skill with this name")]
    SkillNameTaken,

    #[error("You have already reviewed this session")]
    ReviewAlreadySubmitted,

    #[error("Insufficient credits: balance {balance}, required {required}")]
    InsufficientCredits { balance: i64, required: i64 },

    #[error("Cannot change session status from {from} to {to}")]
    InvalidTransition {
        from: SessionStatus,
        to: SessionStatus,
    },

    /// Lost a compare-and-set against a concurrent update
    #[error("Session was updated by another request")]
    StaleSession,

    // ------------------------------------------------------------------
    // Passthrough
    // ------------------------------------------------------------------
    /// Input rejected by a value object (carries its own status)
    #[error(transparent)]
    Rejected(#[from] AppError),

    /// Failure inside the auth crate (demo seeding)
    #[error(transparent)]
    Auth(#[from] auth::AuthError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExchangeError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExchangeError::UserNotFound
            | ExchangeError::SkillNotFound
            | ExchangeError::SessionNotFound
            | ExchangeError::MessageNotFound => ErrorKind::NotFound,
            ExchangeError::NotOwner
            | ExchangeError::NotParticipant
            | ExchangeError::OnlyTeacher
            | ExchangeError::NotReceiver
            | ExchangeError::InvalidDemoKey => ErrorKind::Forbidden,
            ExchangeError::SelfRequest
            | ExchangeError::TeacherMismatch
            | ExchangeError::SessionNotCompleted
            | ExchangeError::SelfMessage => ErrorKind::BadRequest,
            ExchangeError::SkillNameTaken
            | ExchangeError::ReviewAlreadySubmitted
            | ExchangeError::InsufficientCredits { .. }
            | ExchangeError::InvalidTransition { .. }
            | ExchangeError::StaleSession => ErrorKind::Conflict,
            ExchangeError::Rejected(e) => e.kind(),
            ExchangeError::Auth(e) => e.kind(),
            ExchangeError::Database(_) | ExchangeError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError
    ///
    /// Database failures keep the kernel classification (503 for an
    /// unavailable pool or a lock conflict, 500 otherwise) without leaking
    /// driver details.
    pub fn into_app_error(self) -> AppError {
        match self {
            ExchangeError::Rejected(e) => e,
            ExchangeError::Auth(e) => e.into_app_error(),
            ExchangeError::Database(e) => {
                let kind = AppError::from(e).kind();
                AppError::new(kind, "Database error")
            }
            ExchangeError::Internal(_) => AppError::internal("Internal server error"),
            other => AppError::new(other.kind(), other.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            ExchangeError::Database(e) => {
                tracing::error!(error = %e, "Exchange database error");
            }
            ExchangeError::Internal(msg) => {
                tracing::error!(message = %msg, "Exchange internal error");
            }
            ExchangeError::InvalidDemoKey => {
                tracing::warn!("Rejected demo reset attempt");
            }
            ExchangeError::InsufficientCredits { balance, required } => {
                tracing::info!(balance, required, "Session completion refused");
            }
            _ => {
                tracing::debug!(error = %self, "Exchange error");
            }
        }
    }
}

impl IntoResponse for ExchangeError {
    fn into_response(self) -> Response {
        self.log();
        self.into_app_error().into_response()
    }
}

/// Ledger failures surfaced through auth's account port
impl From<ExchangeError> for auth::AuthError {
    fn from(err: ExchangeError) -> Self {
        match err {
            ExchangeError::Database(e) => auth::AuthError::Database(e),
            ExchangeError::Auth(e) => e,
            other => auth::AuthError::Rejected(other.into_app_error()),
        }
    }
}

impl From<platform::password::PasswordHashError> for ExchangeError {
    fn from(err: platform::password::PasswordHashError) -> Self {
        ExchangeError::Internal(err.to_string())
    }
}
