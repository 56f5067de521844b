//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod sign_in;
pub mod sign_up;
pub mod token;
pub mod verify;

// Re-exports
pub use config::AuthConfig;
pub use sign_in::{SignInInput, SignInUseCase};
pub use sign_up::{SignUpInput, SignUpUseCase};
pub use token::{BearerToken, TokenClaims, TokenIssuer};
pub use verify::{VerifyOutput, VerifyUseCase};

use crate::domain::entity::User;

/// Result of a successful signup or login
#[derive(Debug)]
pub struct AuthenticatedUser {
    pub user: User,
    pub credits: i64,
    pub token: BearerToken,
}
