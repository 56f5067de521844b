//! Sign In Use Case
//!
//! Exchanges email and password for a bearer token.

use std::sync::Arc;

use kernel::error::app_error::AppError;

use crate::application::AuthenticatedUser;
use crate::application::config::AuthConfig;
use crate::application::token::TokenIssuer;
use crate::domain::repository::{AccountPort, UserRepository};
use crate::domain::value_object::{Email, RawPassword};
use crate::error::{AuthError, AuthResult};

/// Sign in input
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

/// Sign in use case
pub struct SignInUseCase<U, A>
where
    U: UserRepository,
    A: AccountPort,
{
    user_repo: Arc<U>,
    accounts: Arc<A>,
    config: Arc<AuthConfig>,
    tokens: Arc<TokenIssuer>,
}

impl<U, A> SignInUseCase<U, A>
where
    U: UserRepository,
    A: AccountPort,
{
    pub fn new(
        user_repo: Arc<U>,
        accounts: Arc<A>,
        config: Arc<AuthConfig>,
        tokens: Arc<TokenIssuer>,
    ) -> Self {
        Self {
            user_repo,
            accounts,
            config,
            tokens,
        }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<AuthenticatedUser> {
        if input.email.trim().is_empty() || input.password.is_empty() {
            return Err(AppError::bad_request("Email and password are required").into());
        }

        // From here on every failure looks the same to the caller
        let email = Email::new(&input.email).map_err(|_| AuthError::InvalidCredentials)?;

        let user = self
            .user_repo
            .find_user_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let raw_password =
            RawPassword::new(input.password).map_err(|_| AuthError::InvalidCredentials)?;

        if !user.password.verify(&raw_password, self.config.pepper()) {
            return Err(AuthError::InvalidCredentials);
        }

        let credits = self.accounts.ensure_account(&user.user_id).await?;
        let token = self.tokens.issue(&user.user_id);

        tracing::info!(user_id = %user.user_id, "User signed in");

        Ok(AuthenticatedUser {
            user,
            credits,
            token,
        })
    }
}
