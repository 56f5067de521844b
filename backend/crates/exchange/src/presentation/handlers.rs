//! HTTP Handlers

use std::sync::Arc;

use auth::{CurrentUser, TokenIssuer};
use axum::Json;
use axum::extract::{FromRef, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use kernel::error::app_error::{AppError, ResultExt};
use kernel::error::kind::ErrorKind;
use kernel::id::Id;

use crate::application::{
    AddSkillInput, AddSkillUseCase, BrowseSkillsUseCase, CreditLedgerUseCase, DeleteSkillUseCase,
    ExchangeConfig, ExpireCreditsUseCase, InboxUseCase, ListSessionsUseCase, MarkReadUseCase,
    RequestSessionUseCase, ResetDemoUseCase, SendMessageInput, SendMessageUseCase,
    SubmitReviewInput, SubmitReviewUseCase, UpdateSessionStatusUseCase, UserReviewsUseCase,
};
use crate::domain::entity::AnonymousReview;
use crate::domain::repository::ExchangeStore;
use crate::domain::value_object::Page;
use crate::error::ExchangeResult;
use crate::presentation::dto::{
    AddSkillRequest, BalanceResponse, ConversationResponse, ExpireResponse, ExpiringResponse,
    HistoryQuery, HistoryResponse, InboxResponse, MessageResponse, RequestSessionRequest,
    ResetDemoResponse, ReviewsResponse, SendMessageRequest, SessionResponse, SkillListingResponse,
    SkillResponse, SubmitReviewRequest, UpdateSessionRequest,
};

/// Header carrying the demo reset key
pub const DEMO_KEY_HEADER: &str = "x-demo-key";

/// Shared state for exchange handlers
#[derive(Clone)]
pub struct ExchangeAppState<R>
where
    R: ExchangeStore,
{
    pub repo: Arc<R>,
    pub config: Arc<ExchangeConfig>,
    pub tokens: Arc<TokenIssuer>,
}

impl<R> FromRef<ExchangeAppState<R>> for Arc<TokenIssuer>
where
    R: ExchangeStore,
{
    fn from_ref(state: &ExchangeAppState<R>) -> Self {
        state.tokens.clone()
    }
}

// ============================================================================
// Input helpers
// ============================================================================

fn parse_id<T>(raw: &str, field: &str) -> ExchangeResult<Id<T>> {
    let id = raw
        .trim()
        .parse::<Id<T>>()
        .map_app_err(ErrorKind::BadRequest, format!("Invalid {field}"))?;
    Ok(id)
}

fn required_id<T>(raw: Option<String>, field: &str) -> ExchangeResult<Id<T>> {
    let raw = raw
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::bad_request(format!("{field} is required")))?;
    parse_id(&raw, field)
}

fn optional_number(raw: Option<String>, field: &str) -> ExchangeResult<Option<u32>> {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return Ok(None);
    };
    let n = raw
        .trim()
        .parse::<u32>()
        .map_app_err(ErrorKind::BadRequest, format!("{field} must be a positive integer"))?;
    Ok(Some(n))
}

// ============================================================================
// Skills
// ============================================================================

/// GET /api/skills
pub async fn list_skills<R>(
    State(state): State<ExchangeAppState<R>>,
) -> ExchangeResult<Json<Vec<SkillListingResponse>>>
where
    R: ExchangeStore,
{
    let use_case = BrowseSkillsUseCase::new(state.repo.clone());
    let listings = use_case.all().await?;

    Ok(Json(listings.into_iter().map(Into::into).collect()))
}

/// GET /api/user/{id}/skills
pub async fn user_skills<R>(
    State(state): State<ExchangeAppState<R>>,
    Path(user_id): Path<String>,
) -> ExchangeResult<Json<Vec<SkillResponse>>>
where
    R: ExchangeStore,
{
    let user_id = parse_id(&user_id, "user id")?;
    let use_case = BrowseSkillsUseCase::new(state.repo.clone());
    let skills = use_case.of_user(&user_id).await?;

    Ok(Json(skills.into_iter().map(Into::into).collect()))
}

/// POST /api/user/{id}/skills
pub async fn add_skill<R>(
    State(state): State<ExchangeAppState<R>>,
    current: CurrentUser,
    Path(owner_id): Path<String>,
    Json(req): Json<AddSkillRequest>,
) -> ExchangeResult<(StatusCode, Json<SkillResponse>)>
where
    R: ExchangeStore,
{
    let input = AddSkillInput {
        owner_id: parse_id(&owner_id, "user id")?,
        name: req.name,
        description: req.description,
    };

    let use_case = AddSkillUseCase::new(state.repo.clone());
    let skill = use_case.execute(&current.user_id, input).await?;

    Ok((StatusCode::CREATED, Json(skill.into())))
}

/// DELETE /api/user/{id}/skills/{skill_id}
pub async fn delete_skill<R>(
    State(state): State<ExchangeAppState<R>>,
    current: CurrentUser,
    Path((owner_id, skill_id)): Path<(String, String)>,
) -> ExchangeResult<StatusCode>
where
    R: ExchangeStore,
{
    let owner_id = parse_id(&owner_id, "user id")?;
    let skill_id = parse_id(&skill_id, "skill id")?;

    let use_case = DeleteSkillUseCase::new(state.repo.clone());
    use_case
        .execute(&current.user_id, &owner_id, &skill_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Sessions
// ============================================================================

/// POST /api/sessions
pub async fn request_session<R>(
    State(state): State<ExchangeAppState<R>>,
    current: CurrentUser,
    Json(req): Json<RequestSessionRequest>,
) -> ExchangeResult<(StatusCode, Json<SessionResponse>)>
where
    R: ExchangeStore,
{
    let skill_id = required_id(req.skill_id, "skillId")?;
    let teacher_id = required_id(req.teacher_id, "teacherId")?;

    let use_case = RequestSessionUseCase::new(state.repo.clone());
    let session = use_case
        .execute(&current.user_id, &skill_id, &teacher_id)
        .await?;

    Ok((StatusCode::CREATED, Json(session.into())))
}

/// GET /api/sessions
pub async fn list_sessions<R>(
    State(state): State<ExchangeAppState<R>>,
    current: CurrentUser,
) -> ExchangeResult<Json<Vec<SessionResponse>>>
where
    R: ExchangeStore,
{
    let use_case = ListSessionsUseCase::new(state.repo.clone());
    let sessions = use_case.execute(&current.user_id).await?;

    Ok(Json(sessions.into_iter().map(Into::into).collect()))
}

/// PUT /api/sessions/{id}
pub async fn update_session<R>(
    State(state): State<ExchangeAppState<R>>,
    current: CurrentUser,
    Path(session_id): Path<String>,
    Json(req): Json<UpdateSessionRequest>,
) -> ExchangeResult<Json<SessionResponse>>
where
    R: ExchangeStore,
{
    let session_id = parse_id(&session_id, "session id")?;

    let use_case = UpdateSessionStatusUseCase::new(state.repo.clone(), state.config.clone());
    let session = use_case
        .execute(&current.user_id, &session_id, req.status.trim())
        .await?;

    Ok(Json(session.into()))
}

// ============================================================================
// Credits
// ============================================================================

/// GET /api/credits/balance
pub async fn credit_balance<R>(
    State(state): State<ExchangeAppState<R>>,
    current: CurrentUser,
) -> ExchangeResult<Json<BalanceResponse>>
where
    R: ExchangeStore,
{
    let use_case = CreditLedgerUseCase::new(state.repo.clone(), state.config.clone());
    let summary = use_case.balance(&current.user_id).await?;

    Ok(Json(summary.into()))
}

/// GET /api/credits/history?page=&limit=
pub async fn credit_history<R>(
    State(state): State<ExchangeAppState<R>>,
    current: CurrentUser,
    Query(query): Query<HistoryQuery>,
) -> ExchangeResult<Json<HistoryResponse>>
where
    R: ExchangeStore,
{
    let page = Page::new(
        optional_number(query.page, "page")?,
        optional_number(query.limit, "limit")?,
    )?;

    let use_case = CreditLedgerUseCase::new(state.repo.clone(), state.config.clone());
    let (transactions, total) = use_case.history(&current.user_id, &page).await?;

    Ok(Json(HistoryResponse {
        transactions: transactions.into_iter().map(Into::into).collect(),
        page: page.number(),
        limit: page.limit(),
        total,
    }))
}

/// GET /api/credits/expiring
pub async fn expiring_credits<R>(
    State(state): State<ExchangeAppState<R>>,
    current: CurrentUser,
) -> ExchangeResult<Json<ExpiringResponse>>
where
    R: ExchangeStore,
{
    let use_case = CreditLedgerUseCase::new(state.repo.clone(), state.config.clone());
    let expiring = use_case.expiring(&current.user_id).await?;

    Ok(Json(expiring.into()))
}

/// POST /api/credits/expire
pub async fn expire_credits<R>(
    State(state): State<ExchangeAppState<R>>,
    current: CurrentUser,
) -> ExchangeResult<Json<ExpireResponse>>
where
    R: ExchangeStore,
{
    tracing::debug!(user_id = %current.user_id, "Expiry sweep requested");

    let use_case = ExpireCreditsUseCase::new(state.repo.clone());
    let sweep = use_case.execute().await?;

    Ok(Json(sweep.into()))
}

// ============================================================================
// Reviews
// ============================================================================

/// POST /api/reviews
pub async fn submit_review<R>(
    State(state): State<ExchangeAppState<R>>,
    current: CurrentUser,
    Json(req): Json<SubmitReviewRequest>,
) -> ExchangeResult<(StatusCode, Json<AnonymousReview>)>
where
    R: ExchangeStore,
{
    let input = SubmitReviewInput {
        session_id: required_id(req.session_id, "sessionId")?,
        rating: req
            .rating
            .ok_or_else(|| AppError::bad_request("Rating is required"))?,
        text: req.text,
    };

    let use_case = SubmitReviewUseCase::new(state.repo.clone());
    let review = use_case.execute(&current.user_id, input).await?;

    Ok((StatusCode::CREATED, Json(review)))
}

/// GET /api/reviews/{user_id}
pub async fn user_reviews<R>(
    State(state): State<ExchangeAppState<R>>,
    Path(user_id): Path<String>,
) -> ExchangeResult<Json<ReviewsResponse>>
where
    R: ExchangeStore,
{
    let user_id = parse_id(&user_id, "user id")?;

    let use_case = UserReviewsUseCase::new(state.repo.clone());
    let (reviews, summary) = use_case.execute(&user_id).await?;

    Ok(Json(ReviewsResponse::new(reviews, summary)))
}

// ============================================================================
// Messages
// ============================================================================

/// GET /api/messages
pub async fn inbox<R>(
    State(state): State<ExchangeAppState<R>>,
    current: CurrentUser,
) -> ExchangeResult<Json<InboxResponse>>
where
    R: ExchangeStore,
{
    let use_case = InboxUseCase::new(state.repo.clone());
    let (messages, unread_count) = use_case.inbox(&current.user_id).await?;

    Ok(Json(InboxResponse {
        messages: messages.into_iter().map(Into::into).collect(),
        unread_count,
    }))
}

/// POST /api/messages
pub async fn send_message<R>(
    State(state): State<ExchangeAppState<R>>,
    current: CurrentUser,
    Json(req): Json<SendMessageRequest>,
) -> ExchangeResult<(StatusCode, Json<MessageResponse>)>
where
    R: ExchangeStore,
{
    let input = SendMessageInput {
        receiver_id: required_id(req.receiver_id, "receiverId")?,
        text: req.text,
    };

    let use_case = SendMessageUseCase::new(state.repo.clone());
    let message = use_case.execute(&current.user_id, input).await?;

    Ok((StatusCode::CREATED, Json(message.into())))
}

/// GET /api/messages/{id}
pub async fn conversation<R>(
    State(state): State<ExchangeAppState<R>>,
    current: CurrentUser,
    Path(other_id): Path<String>,
) -> ExchangeResult<Json<ConversationResponse>>
where
    R: ExchangeStore,
{
    let other_id = parse_id(&other_id, "user id")?;

    let use_case = InboxUseCase::new(state.repo.clone());
    let messages = use_case.conversation(&current.user_id, &other_id).await?;

    Ok(Json(ConversationResponse {
        messages: messages.into_iter().map(Into::into).collect(),
    }))
}

/// PUT /api/messages/{id}/read
pub async fn mark_read<R>(
    State(state): State<ExchangeAppState<R>>,
    current: CurrentUser,
    Path(message_id): Path<String>,
) -> ExchangeResult<StatusCode>
where
    R: ExchangeStore,
{
    let message_id = parse_id(&message_id, "message id")?;

    let use_case = MarkReadUseCase::new(state.repo.clone());
    use_case.execute(&current.user_id, &message_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Demo
// ============================================================================

/// POST /api/reset-demo
pub async fn reset_demo<R>(
    State(state): State<ExchangeAppState<R>>,
    headers: HeaderMap,
) -> ExchangeResult<Json<ResetDemoResponse>>
where
    R: ExchangeStore,
{
    let presented = headers
        .get(DEMO_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    let use_case = ResetDemoUseCase::new(state.repo.clone(), state.config.clone());
    let summary = use_case.execute(presented).await?;

    Ok(Json(summary.into()))
}
