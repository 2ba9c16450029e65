//! Service error types.

use common::{ProductId, UserId};
use thiserror::Error;

/// Errors surfaced by the collaborator services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Product does not exist in the inventory ledger.
    #[error("Product with ID {0} not found")]
    ProductNotFound(ProductId),

    /// Live stock does not cover the requested quantity.
    #[error(
        "Insufficient stock for product {product_name}. Available: {available}, requested: {requested}"
    )]
    InsufficientStock {
        product_name: String,
        available: u32,
        requested: u32,
    },

    /// No cart exists for the user.
    #[error("Cart not found for user: {0}")]
    CartNotFound(UserId),

    /// The product is not in the user's cart.
    #[error("Product {0} not found in cart")]
    ItemNotFound(ProductId),

    /// User does not exist in the identity service.
    #[error("User with ID {0} not found")]
    UserNotFound(UserId),

    /// A collaborator was unreachable or returned an unexpected error.
    #[error("Upstream service error: {0}")]
    Upstream(String),
}

/// Convenience type alias for service results.
pub type Result<T> = std::result::Result<T, ServiceError>;
