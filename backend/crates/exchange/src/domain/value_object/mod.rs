//! Value Object Module

pub mod credit;
pub mod message_text;
pub mod page;
pub mod review;
pub mod session_status;
pub mod skill;

pub use credit::{TransactionKind, TransactionStatus};
pub use kernel::id::{CreditTransactionId, MessageId, ReviewId, SessionId, SkillId, UserId};
pub use message_text::MessageText;
pub use page::Page;
pub use review::{Rating, ReviewText};
pub use session_status::SessionStatus;
pub use skill::{SkillDescription, SkillName};
