//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - User entity, value objects, repository traits
//! - `application/` - Sign up / sign in / verify use cases, bearer tokens
//! - `infra/` - PostgreSQL implementation
//! - `presentation/` - HTTP handlers, DTOs, router, `CurrentUser` extractor
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (salted, optional pepper), verified in constant time
//! - Stateless bearer tokens: `<user id>.<expiry>.<HMAC-SHA256>`; nothing is stored
//!   server side, so a token stays valid until it expires
//! - Unknown email and wrong password are reported identically
//!
//! Credit balances and skills belong to the `exchange` crate; this crate reaches
//! them only through the [`domain::repository::AccountPort`] trait.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::token::{BearerToken, TokenClaims, TokenIssuer};
pub use domain::entity::{ProfileSkill, User};
pub use domain::repository::{AccountPort, UserRepository};
pub use error::{AuthError, AuthResult};
pub use infra::postgres::{PgAuthRepository, insert_user};
pub use presentation::extractor::CurrentUser;
pub use presentation::router::{auth_router, auth_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}
