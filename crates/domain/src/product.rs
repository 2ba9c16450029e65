//! Product record owned by the inventory ledger.

use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

/// A product with its live stock count.
///
/// `quantity` is the only field the order workflow mutates, and only
/// through the ledger's atomic increment/decrement operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    pub quantity: u32,
    #[serde(default)]
    pub image_url: Option<String>,
    pub brand: String,
    pub category: String,
}

impl Product {
    /// Returns true if live stock covers the requested quantity.
    pub fn has_stock_for(&self, requested: u32) -> bool {
        self.quantity >= requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(quantity: u32) -> Product {
        Product {
            id: ProductId::new(5),
            name: "Widget".to_string(),
            price: Money::from_cents(1000),
            quantity,
            image_url: Some("/img/widget.png".to_string()),
            brand: "Acme".to_string(),
            category: "Tools".to_string(),
        }
    }

    #[test]
    fn test_has_stock_for() {
        assert!(widget(3).has_stock_for(3));
        assert!(widget(3).has_stock_for(1));
        assert!(!widget(2).has_stock_for(5));
    }

    #[test]
    fn test_wire_shape_is_camel_case() {
        let json = serde_json::to_value(widget(3)).unwrap();
        assert_eq!(json["imageUrl"], "/img/widget.png");
        assert_eq!(json["quantity"], 3);
        assert_eq!(json["price"], 1000);
    }
}
