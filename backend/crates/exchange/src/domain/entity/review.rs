//! Review Entity
//!
//! Reviews are stored with the reviewer's identity, which stays available
//! internally (moderation). Everything handed to callers goes through
//! [`AnonymousReview`], which has no reviewer field at all.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entity::session::Session;
use crate::domain::value_object::{Rating, ReviewId, ReviewText, SessionId, SessionStatus, UserId};
use crate::error::{ExchangeError, ExchangeResult};

#[derive(Debug, Clone)]
pub struct Review {
    pub review_id: ReviewId,
    pub session_id: SessionId,
    pub reviewer_id: UserId,
    /// The other participant of the session
    pub target_id: UserId,
    pub rating: Rating,
    pub text: Option<ReviewText>,
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Review `session` as `reviewer`
    ///
    /// Uniqueness per (session, reviewer) is left to the store.
    pub fn for_session(
        session: &Session,
        reviewer: &UserId,
        rating: Rating,
        text: Option<ReviewText>,
        now: DateTime<Utc>,
    ) -> ExchangeResult<Self> {
        let target_id = session
            .counterpart_of(reviewer)
            .ok_or(ExchangeError::NotParticipant)?;

        if session.status != SessionStatus::Completed {
            return Err(ExchangeError::SessionNotCompleted);
        }

        Ok(Self {
            review_id: ReviewId::new(),
            session_id: session.session_id,
            reviewer_id: *reviewer,
            target_id,
            rating,
            text,
            created_at: now,
        })
    }
}

/// Public projection of a review
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnonymousReview {
    pub id: ReviewId,
    pub rating: Rating,
    pub text: Option<ReviewText>,
    pub created_at: DateTime<Utc>,
}

impl From<&Review> for AnonymousReview {
    fn from(review: &Review) -> Self {
        Self {
            id: review.review_id,
            rating: review.rating,
            text: review.text.clone(),
            created_at: review.created_at,
        }
    }
}

/// Count and mean rating of a user's reviews
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSummary {
    pub total: usize,
    /// Mean rounded half up to one decimal, e.g. `"4.5"`; `None` without reviews
    pub average: Option<String>,
}

impl ReviewSummary {
    pub fn from_ratings(ratings: impl IntoIterator<Item = Rating>) -> Self {
        let (count, sum) = ratings
            .into_iter()
            .fold((0i64, 0i64), |(n, s), r| (n + 1, s + i64::from(r.value())));

        if count == 0 {
            return Self {
                total: 0,
                average: None,
            };
        }

        // round(sum / count, 1) in tenths, half up, integers only
        let tenths = (sum * 20 + count) / (2 * count);

        Self {
            total: count as usize,
            average: Some(format!("{}.{}", tenths / 10, tenths % 10)),
        }
    }
}
