//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations with no SkillSwap vocabulary in them:
//! - Password policy and Argon2id hashing
//! - Random secrets, constant-time comparison, base64 helpers

pub mod crypto;
pub mod password;
