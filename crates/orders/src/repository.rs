//! Order repository seam and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{OrderNumber, UserId};
use domain::{Order, OrderStatus};

use crate::error::{OrderFlowError, Result};

/// Trait for order persistence.
///
/// Orders are addressed by order number. Everything except the status is
/// immutable once inserted.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persists a new order, assigning storage ids to it and its items.
    async fn insert(&self, order: Order) -> Result<Order>;

    /// Looks an order up by its order number.
    async fn find_by_number(&self, number: &OrderNumber) -> Result<Option<Order>>;

    /// Returns all orders placed by a user, oldest first.
    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Order>>;

    /// Updates an order's status. Fails with `OrderNotFound` when the
    /// number is unknown.
    async fn set_status(&self, number: &OrderNumber, status: OrderStatus) -> Result<Order>;
}

#[derive(Debug, Default)]
struct RepositoryState {
    orders: HashMap<OrderNumber, Order>,
    next_order_id: i64,
    next_item_id: i64,
}

/// In-memory order repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderRepository {
    state: Arc<RwLock<RepositoryState>>,
}

impl InMemoryOrderRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn insert(&self, mut order: Order) -> Result<Order> {
        let mut state = self.state.write().unwrap();
        state.next_order_id += 1;
        order.id = state.next_order_id;
        for item in &mut order.order_items {
            state.next_item_id += 1;
            item.id = state.next_item_id;
        }
        state.orders.insert(order.order_number.clone(), order.clone());
        Ok(order)
    }

    async fn find_by_number(&self, number: &OrderNumber) -> Result<Option<Order>> {
        Ok(self.state.read().unwrap().orders.get(number).cloned())
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let state = self.state.read().unwrap();
        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|order| order.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by_key(|order| order.id);
        Ok(orders)
    }

    async fn set_status(&self, number: &OrderNumber, status: OrderStatus) -> Result<Order> {
        let mut state = self.state.write().unwrap();
        let order = state
            .orders
            .get_mut(number)
            .ok_or_else(|| OrderFlowError::OrderNotFound(number.clone()))?;
        order.status = status;
        Ok(order.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Money, ProductId};
    use domain::{OrderItem, ShippingDetails};

    fn order_for(user_id: i64) -> Order {
        let mut order = Order::pending(
            UserId::new(user_id),
            ShippingDetails {
                first_name: "Ana".to_string(),
                last_name: "Kovac".to_string(),
                street: "5 Elm St".to_string(),
                phone: "555-0101".to_string(),
            },
        );
        order.push_item(OrderItem {
            id: 0,
            product_id: ProductId::new(5),
            product_name: "Widget".to_string(),
            image_url: None,
            unit_price: Money::from_cents(1000),
            quantity: 2,
        });
        order
    }

    #[tokio::test]
    async fn test_insert_assigns_ids() {
        let repo = InMemoryOrderRepository::new();
        let first = repo.insert(order_for(1)).await.unwrap();
        let second = repo.insert(order_for(1)).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.order_items[0].id, 1);
        assert_eq!(second.order_items[0].id, 2);
    }

    #[tokio::test]
    async fn test_find_by_number_and_user() {
        let repo = InMemoryOrderRepository::new();
        let mine = repo.insert(order_for(1)).await.unwrap();
        repo.insert(order_for(2)).await.unwrap();

        let found = repo.find_by_number(&mine.order_number).await.unwrap();
        assert_eq!(found.unwrap().id, mine.id);

        let by_user = repo.find_by_user(UserId::new(1)).await.unwrap();
        assert_eq!(by_user.len(), 1);
        assert_eq!(by_user[0].id, mine.id);

        assert!(
            repo.find_by_number(&OrderNumber::new("missing"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_set_status() {
        let repo = InMemoryOrderRepository::new();
        let order = repo.insert(order_for(1)).await.unwrap();

        let updated = repo
            .set_status(&order.order_number, OrderStatus::Processing)
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Processing);

        let err = repo
            .set_status(&OrderNumber::new("missing"), OrderStatus::Shipped)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderFlowError::OrderNotFound(_)));
    }
}
