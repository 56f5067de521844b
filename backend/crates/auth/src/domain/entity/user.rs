//! User Entity
//!
//! A registered SkillSwap member. The credit balance is not part of the user
//! row; it lives in the `exchange` ledger and is reached through
//! [`AccountPort`](crate::domain::repository::AccountPort).

use chrono::{DateTime, Utc};

use crate::domain::value_object::{DisplayName, Email, UserId, UserPassword};

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    /// UUID identifier
    pub user_id: UserId,
    /// Login email (unique, lower-cased)
    pub email: Email,
    /// Name shown to other members
    pub display_name: DisplayName,
    /// Argon2id hash
    pub password: UserPassword,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user
    pub fn new(email: Email, display_name: DisplayName, password: UserPassword) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            email,
            display_name,
            password,
            created_at: now,
            updated_at: now,
        }
    }
}
