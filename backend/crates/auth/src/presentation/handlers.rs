//! HTTP Handlers

use axum::Json;
use axum::extract::{FromRef, State};
use axum::http::StatusCode;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::token::TokenIssuer;
use crate::application::{
    SignInInput, SignInUseCase, SignUpInput, SignUpUseCase, TokenClaims, VerifyUseCase,
};
use crate::domain::repository::{AccountPort, UserRepository};
use crate::error::AuthResult;
use crate::presentation::dto::{AuthResponse, ProfileResponse, SignInRequest, SignUpRequest};
use crate::presentation::extractor::CurrentUser;

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<U, A>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    A: AccountPort + Clone + Send + Sync + 'static,
{
    pub users: Arc<U>,
    pub accounts: Arc<A>,
    pub config: Arc<AuthConfig>,
    pub tokens: Arc<TokenIssuer>,
}

impl<U, A> FromRef<AuthAppState<U, A>> for Arc<TokenIssuer>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    A: AccountPort + Clone + Send + Sync + 'static,
{
    fn from_ref(state: &AuthAppState<U, A>) -> Self {
        state.tokens.clone()
    }
}

// ============================================================================
// Sign Up
// ============================================================================

/// POST /auth/signup
pub async fn sign_up<U, A>(
    State(state): State<AuthAppState<U, A>>,
    Json(req): Json<SignUpRequest>,
) -> AuthResult<(StatusCode, Json<AuthResponse>)>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    A: AccountPort + Clone + Send + Sync + 'static,
{
    let use_case = SignUpUseCase::new(
        state.users.clone(),
        state.accounts.clone(),
        state.config.clone(),
        state.tokens.clone(),
    );

    let input = SignUpInput {
        email: req.email,
        password: req.password,
        name: req.name,
    };

    let output = use_case.execute(input).await?;

    Ok((StatusCode::CREATED, Json(output.into())))
}

// ============================================================================
// Sign In
// ============================================================================

/// POST /auth/login
pub async fn sign_in<U, A>(
    State(state): State<AuthAppState<U, A>>,
    Json(req): Json<SignInRequest>,
) -> AuthResult<Json<AuthResponse>>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    A: AccountPort + Clone + Send + Sync + 'static,
{
    let use_case = SignInUseCase::new(
        state.users.clone(),
        state.accounts.clone(),
        state.config.clone(),
        state.tokens.clone(),
    );

    let input = SignInInput {
        email: req.email,
        password: req.password,
    };

    let output = use_case.execute(input).await?;

    Ok(Json(output.into()))
}

// ============================================================================
// Verify
// ============================================================================

/// GET /auth/verify
pub async fn verify<U, A>(
    State(state): State<AuthAppState<U, A>>,
    current: CurrentUser,
) -> AuthResult<Json<ProfileResponse>>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    A: AccountPort + Clone + Send + Sync + 'static,
{
    let use_case = VerifyUseCase::new(state.users.clone(), state.accounts.clone());

    let claims = TokenClaims {
        user_id: current.user_id,
        expires_at: current.expires_at,
    };

    let output = use_case.execute(&claims).await?;

    Ok(Json(output.into()))
}
