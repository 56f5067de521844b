//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use std::net::SocketAddr;
use std::sync::Arc;

use api::config::ServerConfig;
use api::{app, cors_layer};
use auth::PgAuthRepository;
use exchange::{ExpireCreditsUseCase, PgExchangeRepository};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,exchange=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect_with(config.database.connect_options()?)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let store = PgExchangeRepository::new(pool.clone());

    // Startup sweep: flip earns that lapsed while the server was down
    // Errors here should not prevent server startup
    match ExpireCreditsUseCase::new(Arc::new(store.clone())).execute().await {
        Ok(sweep) => {
            tracing::info!(
                transactions = sweep.transactions,
                users = sweep.users,
                "Startup credit expiry completed"
            );
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Startup credit expiry failed, continuing anyway"
            );
        }
    }

    if config.exchange.demo.is_some() {
        tracing::warn!("Demo mode enabled, /api/reset-demo is mounted");
    }

    // Build router
    let app = app(
        PgAuthRepository::new(pool),
        store,
        config.auth,
        config.exchange,
    )
    .layer(cors_layer(&config.frontend_origins));

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
