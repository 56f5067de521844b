//! Application Configuration
//!
//! Configuration for the Exchange application layer.

use chrono::{DateTime, Utc};

use crate::domain::entity::CreditTerms;

/// Exchange application configuration
#[derive(Debug, Clone, Default)]
pub struct ExchangeConfig {
    /// Credit amounts and lifetimes
    pub credits: CreditTerms,
    /// Demo reset; `None` keeps `/api/reset-demo` unmounted
    pub demo: Option<DemoConfig>,
}

/// Demo reset settings
#[derive(Clone)]
pub struct DemoConfig {
    /// Expected `X-Demo-Key` header value
    pub reset_key: String,
    /// Must match the auth pepper so seeded users can log in
    pub password_pepper: Option<Vec<u8>>,
}

impl std::fmt::Debug for DemoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DemoConfig")
            .field("reset_key", &"[REDACTED]")
            .finish()
    }
}

impl ExchangeConfig {
    /// Create config for development (demo reset enabled with `key`)
    pub fn development(key: impl Into<String>) -> Self {
        Self {
            demo: Some(DemoConfig {
                reset_key: key.into(),
                password_pepper: None,
            }),
            ..Default::default()
        }
    }

    /// Upper bound of the "expiring soon" view
    pub fn expiring_soon_until(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.credits.expiring_soon
    }
}
