//! Order placement workflow.
//!
//! The [`OrderOrchestrator`] drives the cross-service placement saga: it
//! pulls the user's cart, validates and decrements stock per line item,
//! snapshots pricing, persists the order and clears the cart. Status
//! updates run through the order state machine, and cancellation triggers
//! best-effort compensating stock restoration.
//!
//! The workflow is deliberately not atomic: there is no cross-service
//! transaction, and a failure mid-pipeline leaves earlier decrements in
//! place unless the rollback knob is enabled.

mod error;
mod orchestrator;
mod repository;

pub use error::OrderFlowError;
pub use orchestrator::OrderOrchestrator;
pub use repository::{InMemoryOrderRepository, OrderRepository};
