//! User Password Value Object
//!
//! Domain wrappers over `platform::password`: [`RawPassword`] is what arrives in
//! a signup/login body, [`UserPassword`] is the Argon2id PHC string that is
//! stored. Clear text never leaves this module except into the hasher.

use kernel::error::app_error::{AppError, AppResult};
use platform::password::{ClearTextPassword, HashedPassword, PasswordPolicyError};
use std::fmt;

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Password as typed by the user, zeroized on drop
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Validate against the password policy
    ///
    /// Policy failures become 400 responses with a user-facing message.
    pub fn new(raw: String) -> AppResult<Self> {
        let clear_text = ClearTextPassword::new(raw).map_err(|e| match e {
            PasswordPolicyError::EmptyOrWhitespace => AppError::bad_request("Password is required"),
            other => AppError::bad_request(other.to_string()),
        })?;

        Ok(Self(clear_text))
    }

    pub(crate) fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// User Password (Hashed, for storage)
// ============================================================================

/// Stored password hash
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    /// Hash a validated raw password
    pub fn from_raw(
        raw: &RawPassword,
        pepper: Option<&[u8]>,
    ) -> Result<Self, platform::password::PasswordHashError> {
        raw.inner().hash(pepper).map(Self)
    }

    /// Rehydrate from the `password_hash` column
    pub fn from_phc_string(phc_string: impl Into<String>) -> AppResult<Self> {
        HashedPassword::from_phc_string(phc_string)
            .map(Self)
            .map_err(|e| AppError::internal("Invalid password hash in database").with_source(e))
    }

    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    /// Constant-time verification; the pepper must match the one used to hash
    pub fn verify(&self, raw: &RawPassword, pepper: Option<&[u8]>) -> bool {
        self.0.verify(raw.inner(), pepper)
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_password_policy_maps_to_400() {
        assert!(RawPassword::new("Guitar#Lessons42".to_string()).is_ok());

        let err = RawPassword::new("short".to_string()).unwrap_err();
        assert_eq!(err.status_code(), 400);

        let err = RawPassword::new("".to_string()).unwrap_err();
        assert_eq!(err.message(), "Password is required");

        assert!(RawPassword::new("password123".to_string()).is_err());
    }

    #[test]
    fn test_hash_and_verify() {
        let raw = RawPassword::new("Guitar#Lessons42".to_string()).unwrap();
        let hashed = UserPassword::from_raw(&raw, None).unwrap();
        assert!(hashed.verify(&raw, None));

        let wrong = RawPassword::new("Spanish#Lessons42".to_string()).unwrap();
        assert!(!hashed.verify(&wrong, None));
    }

    #[test]
    fn test_phc_string_roundtrip() {
        let raw = RawPassword::new("Guitar#Lessons42".to_string()).unwrap();
        let hashed = UserPassword::from_raw(&raw, Some(b"pepper")).unwrap();

        let restored = UserPassword::from_phc_string(hashed.as_phc_string()).unwrap();
        assert!(restored.verify(&raw, Some(b"pepper")));
        assert!(!restored.verify(&raw, None));
    }

    #[test]
    fn test_corrupt_hash_is_server_error() {
        let err = UserPassword::from_phc_string("plain-text-password").unwrap_err();
        assert!(err.is_server_error());
    }

    #[test]
    fn test_debug_redaction() {
        let raw = RawPassword::new("Secret#Lessons42".to_string()).unwrap();
        assert!(!format!("{:?}", raw).contains("Secret"));

        let hashed = UserPassword::from_raw(&raw, None).unwrap();
        assert!(!format!("{:?}", hashed).contains("argon2"));
    }
}
