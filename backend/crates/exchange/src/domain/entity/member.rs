//! Member
//!
//! Read-only view of a user row, as the exchange context needs it.

use crate::domain::value_object::UserId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
}
