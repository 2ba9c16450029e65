//! Shared types used by every store service.

mod types;

pub use types::{Money, OrderNumber, ProductId, UserId};
