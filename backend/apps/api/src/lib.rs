//! SkillSwap API
//!
//! Router composition shared by the server binary and the HTTP tests:
//! - `/health` - liveness with uptime and version
//! - `/auth` - signup, login, token verification
//! - `/api` - skills, sessions, credits, reviews, messages, demo reset

pub mod config;

use std::sync::Arc;
use std::time::Instant;

use auth::{AuthConfig, TokenIssuer, UserRepository, auth_router_generic};
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderName, HeaderValue, Method, header},
    routing::get,
};
use exchange::{AccountProvisioner, ExchangeConfig, ExchangeStore, exchange_router_generic};
use serde::Serialize;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime: u64,
    version: &'static str,
}

async fn health(State(started): State<Arc<Instant>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime: started.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// CORS for the configured frontend origins
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            HeaderName::from_static("x-demo-key"),
        ]))
        .allow_credentials(true)
}

/// Build the full application router
///
/// `users` backs the auth crate and `store` everything else; with Postgres
/// they share one pool, in tests one in-memory store plays both roles.
pub fn app<U, R>(users: U, store: R, auth: AuthConfig, exchange: ExchangeConfig) -> Router
where
    U: UserRepository + Clone + Send + Sync + 'static,
    R: ExchangeStore,
{
    let tokens = Arc::new(TokenIssuer::new(&auth));
    let accounts = AccountProvisioner::new(Arc::new(store.clone()), exchange.credits);

    let health_router = Router::new()
        .route("/health", get(health))
        .with_state(Arc::new(Instant::now()));

    Router::new()
        .merge(health_router)
        .nest("/auth", auth_router_generic(users, accounts, auth, tokens.clone()))
        .nest("/api", exchange_router_generic(store, exchange, tokens))
        .layer(TraceLayer::new_for_http())
}
