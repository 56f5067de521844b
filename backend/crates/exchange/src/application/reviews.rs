//! Review Use Cases

use std::sync::Arc;

use chrono::Utc;

use crate::domain::entity::{AnonymousReview, Review, ReviewSummary};
use crate::domain::repository::{MemberDirectory, ReviewRepository, SessionRepository};
use crate::domain::value_object::{Rating, ReviewText, SessionId, UserId};
use crate::error::{ExchangeError, ExchangeResult};

/// Submit review input
pub struct SubmitReviewInput {
    pub session_id: SessionId,
    pub rating: i64,
    pub text: Option<String>,
}

/// Review the other participant of a completed session
pub struct SubmitReviewUseCase<R>
where
    R: SessionRepository + ReviewRepository,
{
    repo: Arc<R>,
}

impl<R> SubmitReviewUseCase<R>
where
    R: SessionRepository + ReviewRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        reviewer: &UserId,
        input: SubmitReviewInput,
    ) -> ExchangeResult<AnonymousReview> {
        let rating = Rating::new(input.rating)?;
        let text = ReviewText::new(input.text.as_deref())?;

        let session = self
            .repo
            .find_session(&input.session_id)
            .await?
            .ok_or(ExchangeError::SessionNotFound)?;

        let review = Review::for_session(&session, reviewer, rating, text, Utc::now())?;

        // Unique (session, reviewer) index rejects resubmissions
        self.repo.insert_review(&review).await?;

        tracing::info!(
            review_id = %review.review_id,
            session_id = %review.session_id,
            rating = review.rating.value(),
            "Review submitted"
        );

        Ok(AnonymousReview::from(&review))
    }
}

/// Reviews received by a user, anonymised
pub struct UserReviewsUseCase<R>
where
    R: ReviewRepository + MemberDirectory,
{
    repo: Arc<R>,
}

impl<R> UserReviewsUseCase<R>
where
    R: ReviewRepository + MemberDirectory,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        user_id: &UserId,
    ) -> ExchangeResult<(Vec<AnonymousReview>, ReviewSummary)> {
        if self.repo.find_member(user_id).await?.is_none() {
            return Err(ExchangeError::UserNotFound);
        }

        let reviews = self.repo.reviews_for(user_id).await?;
        let summary = ReviewSummary::from_ratings(reviews.iter().map(|r| r.rating));
        let anonymous = reviews.iter().map(AnonymousReview::from).collect();

        Ok((anonymous, summary))
    }
}
