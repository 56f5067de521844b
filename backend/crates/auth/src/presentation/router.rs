//! Auth Router

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::token::TokenIssuer;
use crate::domain::repository::{AccountPort, UserRepository};
use crate::infra::postgres::PgAuthRepository;
use crate::presentation::handlers::{self, AuthAppState};

/// Create the Auth router with PostgreSQL repository
pub fn auth_router<A>(
    repo: PgAuthRepository,
    accounts: A,
    config: AuthConfig,
    tokens: Arc<TokenIssuer>,
) -> Router
where
    A: AccountPort + Clone + Send + Sync + 'static,
{
    auth_router_generic(repo, accounts, config, tokens)
}

/// Create a generic Auth router for any repository implementation
pub fn auth_router_generic<U, A>(
    users: U,
    accounts: A,
    config: AuthConfig,
    tokens: Arc<TokenIssuer>,
) -> Router
where
    U: UserRepository + Clone + Send + Sync + 'static,
    A: AccountPort + Clone + Send + Sync + 'static,
{
    let state = AuthAppState {
        users: Arc::new(users),
        accounts: Arc::new(accounts),
        config: Arc::new(config),
        tokens,
    };

    Router::new()
        .route("/signup", post(handlers::sign_up::<U, A>))
        .route("/login", post(handlers::sign_in::<U, A>))
        .route("/verify", get(handlers::verify::<U, A>))
        .with_state(state)
}
