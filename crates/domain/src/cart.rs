//! Shopping cart owned by the cart store, one per user.

use chrono::{DateTime, Utc};
use common::{Money, ProductId, UserId};
use serde::{Deserialize, Serialize};

/// A line item in a cart.
///
/// `price`, `product_name` and `image_url` are snapshots taken from the
/// live product at the moment the item was added or updated — they are not
/// re-fetched implicitly later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: i64,
    pub product_id: ProductId,
    pub product_name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub price: Money,
    pub quantity: u32,
}

impl CartItem {
    /// Returns the total price for this line (price × quantity).
    pub fn total_price(&self) -> Money {
        self.price.multiply(self.quantity)
    }
}

/// A user's cart. At most one cart exists per user; it is created lazily
/// on first access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: i64,
    pub user_id: UserId,
    pub items: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Creates an empty cart for a user.
    pub fn empty(id: i64, user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuilds a cart from its parts, e.g. from a wire payload.
    pub fn from_parts(id: i64, user_id: UserId, items: Vec<CartItem>) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            items,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if the cart holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Finds the line item for a product, if present.
    pub fn item(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    /// Mutable access to the line item for a product, if present.
    pub fn item_mut(&mut self, product_id: ProductId) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|i| i.product_id == product_id)
    }

    /// Removes the line item for a product. Returns true if one was removed.
    pub fn remove_item(&mut self, product_id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        self.items.len() < before
    }

    /// Sum of all line totals.
    pub fn total_amount(&self) -> Money {
        self.items
            .iter()
            .fold(Money::zero(), |acc, item| acc + item.total_price())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, product_id: i64, cents: i64, quantity: u32) -> CartItem {
        CartItem {
            id,
            product_id: ProductId::new(product_id),
            product_name: format!("Product {product_id}"),
            image_url: None,
            price: Money::from_cents(cents),
            quantity,
        }
    }

    #[test]
    fn test_empty_cart() {
        let cart = Cart::empty(1, UserId::new(9));
        assert!(cart.is_empty());
        assert!(cart.total_amount().is_zero());
    }

    #[test]
    fn test_total_amount_sums_line_totals() {
        let mut cart = Cart::empty(1, UserId::new(9));
        cart.items.push(item(1, 5, 1000, 3));
        cart.items.push(item(2, 6, 250, 2));
        assert_eq!(cart.total_amount().cents(), 3500);
    }

    #[test]
    fn test_remove_item() {
        let mut cart = Cart::empty(1, UserId::new(9));
        cart.items.push(item(1, 5, 1000, 3));
        assert!(cart.remove_item(ProductId::new(5)));
        assert!(!cart.remove_item(ProductId::new(5)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_item_lookup() {
        let mut cart = Cart::empty(1, UserId::new(9));
        cart.items.push(item(1, 5, 1000, 3));
        assert_eq!(cart.item(ProductId::new(5)).unwrap().quantity, 3);
        assert!(cart.item(ProductId::new(6)).is_none());
    }
}
