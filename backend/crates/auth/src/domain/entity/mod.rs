//! Entity Module

pub mod profile;
pub mod user;

pub use profile::ProfileSkill;
pub use user::User;
