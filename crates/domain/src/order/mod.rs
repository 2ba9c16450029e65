//! Order records and the status state machine.

mod state;

pub use state::OrderStatus;

use chrono::{DateTime, Utc};
use common::{Money, OrderNumber, ProductId, UserId};
use serde::{Deserialize, Serialize};

/// Shipping snapshot copied from the identity record at placement time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDetails {
    pub first_name: String,
    pub last_name: String,
    pub street: String,
    pub phone: String,
}

/// A line item of a placed order.
///
/// `unit_price` and `quantity` are frozen at order creation and never
/// edited afterwards, so later product price changes cannot leak into
/// existing orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i64,
    pub product_id: ProductId,
    pub product_name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub unit_price: Money,
    pub quantity: u32,
}

impl OrderItem {
    /// Returns the total price for this line (unit price × quantity).
    pub fn total_price(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// A placed order.
///
/// Immutable after creation except for `status`: items and total are
/// frozen when the order is built, and `total_amount` is accumulated once
/// while the placement loop appends items — it is never recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub order_number: OrderNumber,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub total_amount: Money,
    pub shipping: ShippingDetails,
    pub order_items: Vec<OrderItem>,
    pub order_date: DateTime<Utc>,
}

impl Order {
    /// Creates an order shell in `Pending` status with a fresh order number
    /// and no items. The storage id is assigned on insert.
    pub fn pending(user_id: UserId, shipping: ShippingDetails) -> Self {
        Self {
            id: 0,
            order_number: OrderNumber::generate(),
            user_id,
            status: OrderStatus::Pending,
            total_amount: Money::zero(),
            shipping,
            order_items: Vec::new(),
            order_date: Utc::now(),
        }
    }

    /// Appends a line item and accumulates its total into `total_amount`.
    pub fn push_item(&mut self, item: OrderItem) {
        self.total_amount += item.total_price();
        self.order_items.push(item);
    }
}
