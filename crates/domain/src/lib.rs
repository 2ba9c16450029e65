//! Domain model for the store services.
//!
//! This crate holds the value types shared by the cart, inventory, identity
//! and order components: the request-scoped [`Identity`], the inventory
//! [`Product`], the per-user [`Cart`], and the [`Order`] with its status
//! state machine. It is pure data — all I/O lives in the service crates.

mod cart;
mod identity;
mod product;
pub mod order;

pub use cart::{Cart, CartItem};
pub use identity::{Identity, Role, UserDetails};
pub use order::{Order, OrderItem, OrderStatus, ShippingDetails};
pub use product::Product;
