//! Sign Up Use Case
//!
//! Creates a new user, opens their credit account and issues a token.

use std::sync::Arc;

use crate::application::AuthenticatedUser;
use crate::application::config::AuthConfig;
use crate::application::token::TokenIssuer;
use crate::domain::entity::User;
use crate::domain::repository::{AccountPort, UserRepository};
use crate::domain::value_object::{DisplayName, Email, RawPassword, UserPassword};
use crate::error::AuthResult;

/// Sign up input
pub struct SignUpInput {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Sign up use case
pub struct SignUpUseCase<U, A>
where
    U: UserRepository,
    A: AccountPort,
{
    user_repo: Arc<U>,
    accounts: Arc<A>,
    config: Arc<AuthConfig>,
    tokens: Arc<TokenIssuer>,
}

impl<U, A> SignUpUseCase<U, A>
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

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<AuthenticatedUser> {
        let email = Email::new(&input.email)?;
        let display_name = DisplayName::new(&input.name)?;
        let raw_password = RawPassword::new(input.password)?;
        let password = UserPassword::from_raw(&raw_password, self.config.pepper())?;

        let user = User::new(email, display_name, password);

        // Unique index on email decides concurrent signups
        self.user_repo.create_user(&user).await?;

        let credits = self.accounts.ensure_account(&user.user_id).await?;
        let token = self.tokens.issue(&user.user_id);

        tracing::info!(
            user_id = %user.user_id,
            credits,
            "User signed up"
        );

        Ok(AuthenticatedUser {
            user,
            credits,
            token,
        })
    }
}
