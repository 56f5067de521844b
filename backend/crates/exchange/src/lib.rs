//! Exchange Backend Module
//!
//! Everything members do with each other once signed in:
//! - `domain/` - skills, sessions, credit ledger, reviews, messages; repository traits
//! - `application/` - use cases, account provisioning for `auth`, demo reset
//! - `infra/` - PostgreSQL implementation (and an in-memory store behind the
//!   `memory` feature)
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Credit Model
//! - Every account opens with a signup bonus
//! - Completing a session moves `learn_cost` from learner to teacher in one
//!   transaction together with the status change
//! - Earned credits expire after a fixed lifetime; expiry is applied lazily
//!   on every read and by an explicit sweep
//! - The cached balance always equals active earns minus spends

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::accounts::AccountProvisioner;
pub use application::config::{DemoConfig, ExchangeConfig};
pub use application::credits::ExpireCreditsUseCase;
pub use domain::entity::CreditTerms;
pub use domain::repository::ExchangeStore;
pub use error::{ExchangeError, ExchangeResult};
#[cfg(any(test, feature = "memory"))]
pub use infra::memory::MemoryStore;
pub use infra::postgres::PgExchangeRepository;
pub use presentation::router::{exchange_router, exchange_router_generic};

#[cfg(test)]
mod tests;
