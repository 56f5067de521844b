//! Bearer Tokens
//!
//! Stateless signed tokens: `<user uuid>.<expiry unix seconds>.<signature>`,
//! where the signature is base64url(HMAC-SHA256(secret, "<uuid>.<expiry>")).
//! Nothing is stored server side, so a token cannot be revoked before it
//! expires.

use chrono::{DateTime, TimeZone, Utc};
use hmac::{Hmac, Mac};
use platform::crypto::{from_base64_url, to_base64_url};
use serde::Serialize;
use sha2::Sha256;
use uuid::Uuid;

use crate::application::config::AuthConfig;
use crate::domain::value_object::UserId;
use crate::error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

/// Issued credential
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BearerToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Verified token contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenClaims {
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies bearer tokens
pub struct TokenIssuer {
    secret: Vec<u8>,
    ttl_secs: i64,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            secret: config.token_secret.clone(),
            ttl_secs: config.token_ttl_secs(),
        }
    }

    /// Issue a token for `user_id` valid from now
    pub fn issue(&self, user_id: &UserId) -> BearerToken {
        self.issue_at(user_id, Utc::now())
    }

    pub fn issue_at(&self, user_id: &UserId, now: DateTime<Utc>) -> BearerToken {
        let exp = now.timestamp() + self.ttl_secs;
        let payload = format!("{}.{}", user_id, exp);
        let signature = to_base64_url(&self.sign(&payload));

        BearerToken {
            token: format!("{}.{}", payload, signature),
            expires_at: Utc.timestamp_opt(exp, 0).single().unwrap_or(now),
        }
    }

    /// Verify signature and expiry
    pub fn verify(&self, token: &str) -> AuthResult<TokenClaims> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> AuthResult<TokenClaims> {
        let parts: Vec<&str> = token.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(AuthError::InvalidToken);
        }

        let (user_part, exp_part, signature_b64) = (parts[0], parts[1], parts[2]);

        let signature = from_base64_url(signature_b64).map_err(|_| AuthError::InvalidToken)?;

        // Signature first, so a forged expiry is reported as invalid
        let mut mac = self.mac();
        mac.update(user_part.as_bytes());
        mac.update(b".");
        mac.update(exp_part.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::InvalidToken)?;

        let user_id: Uuid = user_part.parse().map_err(|_| AuthError::InvalidToken)?;
        let exp: i64 = exp_part.parse().map_err(|_| AuthError::InvalidToken)?;
        let expires_at = Utc
            .timestamp_opt(exp, 0)
            .single()
            .ok_or(AuthError::InvalidToken)?;

        if now >= expires_at {
            return Err(AuthError::TokenExpired);
        }

        Ok(TokenClaims {
            user_id: UserId::from_uuid(user_id),
            expires_at,
        })
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.secret).expect("HMAC can take key of any size")
    }

    fn sign(&self, payload: &str) -> Vec<u8> {
        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("secret", &"[REDACTED]")
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}
