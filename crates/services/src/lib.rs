//! Collaborator services for the order workflow.
//!
//! Each component the workflow depends on is a trait seam with two
//! implementations: an in-memory one for the single-process deployment and
//! tests, and a `reqwest`-backed client speaking the inter-service wire
//! contract for the distributed deployment.

pub mod cart;
pub mod error;
pub mod http;
pub mod identity;
pub mod inventory;

pub use cart::{CartService, CartStore};
pub use error::ServiceError;
pub use http::{HttpCartService, HttpIdentityService, HttpInventoryService};
pub use identity::{IdentityService, InMemoryIdentityService, UserDirectory};
pub use inventory::{InMemoryInventoryService, InventoryService};
