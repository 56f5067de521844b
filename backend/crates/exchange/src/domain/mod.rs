//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{
    AnonymousReview, BalanceSummary, CreditTerms, CreditTransaction, ExpirySweep, Member, Message,
    MessageView, Review, ReviewSummary, Session, SessionTransition, SessionView, Skill,
    SkillListing,
};
pub use repository::{
    DemoRepository, DemoSeed, ExchangeStore, LedgerRepository, MemberDirectory,
    MessageRepository, ReviewRepository, SessionRepository, SkillRepository,
};
