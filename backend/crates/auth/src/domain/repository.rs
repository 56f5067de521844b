//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use crate::domain::entity::{ProfileSkill, User};
use crate::domain::value_object::{Email, UserId};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a new user; a taken email yields `AuthError::EmailTaken`
    async fn create_user(&self, user: &User) -> AuthResult<()>;

    /// Find user by ID
    async fn find_user_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    /// Find user by (normalised) email
    async fn find_user_by_email(&self, email: &Email) -> AuthResult<Option<User>>;
}

/// Credit account and profile access owned by the `exchange` crate
#[trait_variant::make(AccountPort: Send)]
pub trait LocalAccountPort {
    /// Open the user's credit account if it does not exist yet and return
    /// the current balance
    ///
    /// Idempotent: the signup bonus is granted exactly once per user, and
    /// due earns are expired before the balance is read.
    async fn ensure_account(&self, user_id: &UserId) -> AuthResult<i64>;

    /// Skills the user currently lists
    async fn profile_skills(&self, user_id: &UserId) -> AuthResult<Vec<ProfileSkill>>;
}
