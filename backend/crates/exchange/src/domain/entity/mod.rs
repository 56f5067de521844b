//! Entity Module

pub mod credit;
pub mod member;
pub mod message;
pub mod review;
pub mod session;
pub mod skill;

pub use credit::{
    BalanceSummary, CreditTerms, CreditTransaction, ExpirySweep, SIGNUP_BONUS_REASON,
};
pub use member::Member;
pub use message::{Message, MessageView};
pub use review::{AnonymousReview, Review, ReviewSummary};
pub use session::{Session, SessionTransition, SessionView};
pub use skill::{Skill, SkillListing};
