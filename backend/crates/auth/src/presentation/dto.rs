//! API DTOs (Data Transfer Objects)
//!
//! Request fields default to empty so that a missing field is reported by
//! validation as a 400 instead of a JSON rejection.

use serde::{Deserialize, Serialize};

use crate::application::AuthenticatedUser;
use crate::application::verify::VerifyOutput;
use crate::domain::entity::ProfileSkill;
use crate::domain::value_object::UserId;

// ============================================================================
// Sign Up
// ============================================================================

/// Sign up request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

// ============================================================================
// Sign In
// ============================================================================

/// Sign in request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Signup and login response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub credits: i64,
    pub token: String,
}

impl From<AuthenticatedUser> for AuthResponse {
    fn from(auth: AuthenticatedUser) -> Self {
        Self {
            id: auth.user.user_id,
            email: auth.user.email.into_inner(),
            name: auth.user.display_name.as_str().to_string(),
            credits: auth.credits,
            token: auth.token.token,
        }
    }
}

// ============================================================================
// Verify
// ============================================================================

/// Verify response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub credits: i64,
    pub skills: Vec<ProfileSkill>,
}

impl From<VerifyOutput> for ProfileResponse {
    fn from(output: VerifyOutput) -> Self {
        Self {
            id: output.user.user_id,
            email: output.user.email.into_inner(),
            name: output.user.display_name.as_str().to_string(),
            credits: output.credits,
            skills: output.skills,
        }
    }
}
