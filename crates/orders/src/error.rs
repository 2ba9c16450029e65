//! Order workflow error types.

use common::{OrderNumber, ProductId, UserId};
use domain::OrderStatus;
use services::ServiceError;
use thiserror::Error;

/// Errors raised by the order placement workflow and the status state
/// machine.
#[derive(Debug, Error)]
pub enum OrderFlowError {
    /// The user has no cart or the cart holds no items.
    #[error("Cannot place an order for an empty cart (user {0})")]
    EmptyCart(UserId),

    /// The user does not exist in the identity service.
    #[error("User details not found for ID {0}")]
    UserNotFound(UserId),

    /// A cart line references a product the ledger no longer knows.
    #[error("Product with ID {0} not found")]
    ProductNotFound(ProductId),

    /// Live stock does not cover a cart line.
    #[error(
        "Insufficient stock for product {product_name}. Available: {available}, requested: {requested}"
    )]
    InsufficientStock {
        product_name: String,
        available: u32,
        requested: u32,
    },

    /// No order exists with the given order number.
    #[error("Order with number {0} not found")]
    OrderNotFound(OrderNumber),

    /// The requested status change is not permitted.
    #[error("Cannot change status of a {from} order to {to}")]
    InvalidTransition {
        from: OrderStatus,
        to: OrderStatus,
    },

    /// A collaborator call failed.
    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Convenience type alias for workflow results.
pub type Result<T> = std::result::Result<T, OrderFlowError>;
