//! Presentation Layer
//!
//! HTTP handlers, DTOs, and router.

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::ExchangeAppState;
pub use router::{exchange_router, exchange_router_generic};
