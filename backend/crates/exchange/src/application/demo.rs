//! Demo Reset
//!
//! Only reachable when a reset key is configured. Wipes every table and
//! loads a small fixed community so the front end has something to show.

use std::sync::Arc;

use auth::User;
use auth::domain::value_object::{DisplayName, Email, RawPassword, UserPassword};
use chrono::Utc;
use platform::crypto::constant_time_eq;
use serde::Serialize;

use crate::application::config::ExchangeConfig;
use crate::domain::entity::Skill;
use crate::domain::repository::{DemoRepository, DemoSeed};
use crate::domain::value_object::{SkillDescription, SkillName};
use crate::error::{ExchangeError, ExchangeResult};

/// Shared password of every demo account
pub const DEMO_PASSWORD: &str = "Demo#Swap2024";

const DEMO_USERS: &[(&str, &str, &[(&str, &str)])] = &[
    (
        "alice@example.com",
        "Alice Johnson",
        &[
            ("Guitar", "Acoustic guitar from first chords to fingerpicking"),
            ("Spanish", "Conversational Spanish for beginners"),
        ],
    ),
    (
        "bob@example.com",
        "Bob Smith",
        &[
            ("Python Programming", "Scripts, data wrangling and testing"),
            ("Cooking", "Weeknight dinners and knife skills"),
        ],
    ),
    (
        "carol@example.com",
        "Carol Davis",
        &[
            ("Photography", "Composition, exposure and editing"),
            ("Yoga", "Gentle flow for desk workers"),
        ],
    ),
];

/// Counts reported after a reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DemoSummary {
    pub users: usize,
    pub skills: usize,
}

/// Build the demo users (hashed with `pepper`) and their skills
pub fn demo_seed(pepper: Option<&[u8]>) -> ExchangeResult<DemoSeed> {
    let mut seed = DemoSeed::default();

    for (email, name, skills) in DEMO_USERS {
        let raw = RawPassword::new(DEMO_PASSWORD.to_string())?;
        let password = UserPassword::from_raw(&raw, pepper)?;
        let user = User::new(Email::new(email)?, DisplayName::new(name)?, password);

        for (skill_name, description) in *skills {
            seed.skills.push(Skill::new(
                user.user_id,
                SkillName::new(skill_name)?,
                SkillDescription::new(description)?,
            ));
        }
        seed.users.push(user);
    }

    Ok(seed)
}

pub struct ResetDemoUseCase<R>
where
    R: DemoRepository,
{
    repo: Arc<R>,
    config: Arc<ExchangeConfig>,
}

impl<R> ResetDemoUseCase<R>
where
    R: DemoRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<ExchangeConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, presented_key: Option<&str>) -> ExchangeResult<DemoSummary> {
        let demo = self.config.demo.as_ref().ok_or(ExchangeError::InvalidDemoKey)?;

        let presented = presented_key.unwrap_or_default();
        if presented.is_empty()
            || !constant_time_eq(presented.as_bytes(), demo.reset_key.as_bytes())
        {
            return Err(ExchangeError::InvalidDemoKey);
        }

        let seed = demo_seed(demo.password_pepper.as_deref())?;
        self.repo
            .reset_demo(&seed, &self.config.credits, Utc::now())
            .await?;

        let summary = DemoSummary {
            users: seed.users.len(),
            skills: seed.skills.len(),
        };

        tracing::warn!(
            users = summary.users,
            skills = summary.skills,
            "Demo data reset"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_seed_is_valid() {
        let seed = demo_seed(None).unwrap();
        assert_eq!(seed.users.len(), 3);
        assert_eq!(seed.skills.len(), 6);

        let raw = RawPassword::new(DEMO_PASSWORD.to_string()).unwrap();
        assert!(seed.users.iter().all(|u| u.password.verify(&raw, None)));
        assert!(seed
            .skills
            .iter()
            .all(|s| seed.users.iter().any(|u| u.user_id == s.teacher_id)));
    }
}
