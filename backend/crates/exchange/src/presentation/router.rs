//! Exchange Router
//!
//! Mounted under `/api`.

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use std::sync::Arc;

use auth::TokenIssuer;

use crate::application::config::ExchangeConfig;
use crate::domain::repository::ExchangeStore;
use crate::infra::postgres::PgExchangeRepository;
use crate::presentation::handlers::{self, ExchangeAppState};

/// Create the Exchange router with PostgreSQL repository
pub fn exchange_router(
    repo: PgExchangeRepository,
    config: ExchangeConfig,
    tokens: Arc<TokenIssuer>,
) -> Router {
    exchange_router_generic(repo, config, tokens)
}

/// Create a generic Exchange router for any repository implementation
///
/// `/reset-demo` is only routed when the config carries a demo section.
pub fn exchange_router_generic<R>(
    repo: R,
    config: ExchangeConfig,
    tokens: Arc<TokenIssuer>,
) -> Router
where
    R: ExchangeStore,
{
    let demo_enabled = config.demo.is_some();

    let state = ExchangeAppState {
        repo: Arc::new(repo),
        config: Arc::new(config),
        tokens,
    };

    let router = Router::new()
        // Skills
        .route("/skills", get(handlers::list_skills::<R>))
        .route(
            "/user/{id}/skills",
            get(handlers::user_skills::<R>).post(handlers::add_skill::<R>),
        )
        .route(
            "/user/{id}/skills/{skill_id}",
            delete(handlers::delete_skill::<R>),
        )
        // Sessions
        .route(
            "/sessions",
            get(handlers::list_sessions::<R>).post(handlers::request_session::<R>),
        )
        .route("/sessions/{id}", put(handlers::update_session::<R>))
        // Credits
        .route("/credits/balance", get(handlers::credit_balance::<R>))
        .route("/credits/history", get(handlers::credit_history::<R>))
        .route("/credits/expiring", get(handlers::expiring_credits::<R>))
        .route("/credits/expire", post(handlers::expire_credits::<R>))
        // Reviews
        .route("/reviews", post(handlers::submit_review::<R>))
        .route("/reviews/{user_id}", get(handlers::user_reviews::<R>))
        // Messages
        .route(
            "/messages",
            get(handlers::inbox::<R>).post(handlers::send_message::<R>),
        )
        .route("/messages/{id}", get(handlers::conversation::<R>))
        .route("/messages/{id}/read", put(handlers::mark_read::<R>));

    let router = if demo_enabled {
        router.route("/reset-demo", post(handlers::reset_demo::<R>))
    } else {
        router
    };

    router.with_state(state)
}
