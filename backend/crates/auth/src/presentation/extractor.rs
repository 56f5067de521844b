//! Bearer Token Extractor
//!
//! `CurrentUser` authenticates a request from its `Authorization` header.
//! Any router whose state can hand out the shared [`TokenIssuer`] can take
//! it as a handler argument.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{DateTime, Utc};

use crate::application::token::TokenIssuer;
use crate::domain::value_object::UserId;
use crate::error::AuthError;

/// Authenticated caller
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

impl<S> FromRequestParts<S> for CurrentUser
where
    Arc<TokenIssuer>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let issuer = Arc::<TokenIssuer>::from_ref(state);
        let claims = issuer.verify(token)?;

        Ok(CurrentUser {
            user_id: claims.user_id,
            expires_at: claims.expires_at,
        })
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    let value = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken)?;

    let (scheme, token) = value.split_once(' ').ok_or(AuthError::InvalidToken)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidToken);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }

    Ok(token)
}
