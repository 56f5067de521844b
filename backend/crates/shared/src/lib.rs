//! Shared Kernel - vocabulary shared by every SkillSwap crate
//!
//! This crate only holds what has the same meaning in every bounded context:
//! - The unified error type ([`error::app_error::AppError`]) and its HTTP mapping
//! - Typed identifiers ([`id::Id`]) for users, skills, sessions, reviews,
//!   ledger entries and messages
//!
//! Anything domain specific (credit rules, session transitions) lives in the
//! `auth` and `exchange` crates.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
