//! Application Layer
//!
//! Use cases and application services.

pub mod accounts;
pub mod config;
pub mod credits;
pub mod demo;
pub mod messages;
pub mod reviews;
pub mod sessions;
pub mod skills;

// Re-exports
pub use accounts::AccountProvisioner;
pub use config::{DemoConfig, ExchangeConfig};
pub use credits::{CreditLedgerUseCase, ExpireCreditsUseCase};
pub use demo::{DemoSummary, ResetDemoUseCase, demo_seed};
pub use messages::{InboxUseCase, MarkReadUseCase, SendMessageInput, SendMessageUseCase};
pub use reviews::{SubmitReviewInput, SubmitReviewUseCase, UserReviewsUseCase};
pub use sessions::{ListSessionsUseCase, RequestSessionUseCase, UpdateSessionStatusUseCase};
pub use skills::{AddSkillInput, AddSkillUseCase, BrowseSkillsUseCase, DeleteSkillUseCase};
