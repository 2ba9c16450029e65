//! The order placement saga and status state machine.

use common::{OrderNumber, ProductId, UserId};
use domain::{Order, OrderItem, OrderStatus, ShippingDetails};
use services::{CartService, IdentityService, InventoryService};

use crate::error::{OrderFlowError, Result};
use crate::repository::OrderRepository;

/// Orchestrates the cross-service order workflow.
///
/// Placement runs as a strict sequential pipeline: cart fetch, identity
/// lookup, then per cart line a live stock check followed by an atomic
/// decrement. Collaborator calls are never parallel, so ordering holds
/// within one invocation — but nothing serializes two invocations against
/// each other, and two concurrent placements for the same product can both
/// pass the stock check before either decrements. The ledger's atomic
/// decrement keeps stock non-negative when that race fires.
pub struct OrderOrchestrator<C, U, I, R> {
    carts: C,
    identity: U,
    inventory: I,
    orders: R,
    rollback_on_failure: bool,
}

impl<C, U, I, R> OrderOrchestrator<C, U, I, R>
where
    C: CartService,
    U: IdentityService,
    I: InventoryService,
    R: OrderRepository,
{
    /// Creates an orchestrator over the collaborator seams.
    ///
    /// By default a failure mid-placement leaves already-applied decrements
    /// in place, matching the observed behaviour of the workflow.
    pub fn new(carts: C, identity: U, inventory: I, orders: R) -> Self {
        Self {
            carts,
            identity,
            inventory,
            orders,
            rollback_on_failure: false,
        }
    }

    /// Enables compensation of already-applied decrements when a later
    /// step of the same placement fails.
    pub fn with_rollback_on_failure(mut self, enabled: bool) -> Self {
        self.rollback_on_failure = enabled;
        self
    }

    /// Places an order from the user's cart.
    ///
    /// Pipeline: fetch cart → fetch shipping details → order shell in
    /// `Pending` → per line item: live re-fetch, sufficiency check, atomic
    /// decrement, snapshot from the cart line → persist → best-effort cart
    /// clear. A cart-clear failure is logged, never surfaced: the order is
    /// already committed at that point.
    #[tracing::instrument(skip(self))]
    pub async fn place_order(&self, user_id: UserId) -> Result<Order> {
        metrics::counter!("order_placements_total").increment(1);
        let start = std::time::Instant::now();

        let cart = match self.carts.get_cart(user_id).await? {
            Some(cart) if !cart.is_empty() => cart,
            _ => {
                tracing::warn!(%user_id, "cart is empty or not found");
                return Err(OrderFlowError::EmptyCart(user_id));
            }
        };
        tracing::info!(%user_id, items = cart.items.len(), "cart fetched");

        let user = self
            .identity
            .user_details(user_id)
            .await?
            .ok_or(OrderFlowError::UserNotFound(user_id))?;

        let mut order = Order::pending(
            user_id,
            ShippingDetails {
                first_name: user.first_name,
                last_name: user.last_name,
                street: user.address,
                phone: user.phone_number,
            },
        );

        // Applied decrements of this placement, kept for the optional
        // rollback path.
        let mut applied: Vec<(ProductId, u32)> = Vec::new();

        for line in &cart.items {
            let product = match self.inventory.get_product(line.product_id).await {
                Ok(Some(product)) => product,
                Ok(None) => {
                    return self
                        .abort(&applied, OrderFlowError::ProductNotFound(line.product_id))
                        .await;
                }
                Err(err) => return self.abort(&applied, err.into()).await,
            };

            if !product.has_stock_for(line.quantity) {
                return self
                    .abort(
                        &applied,
                        OrderFlowError::InsufficientStock {
                            product_name: product.name,
                            available: product.quantity,
                            requested: line.quantity,
                        },
                    )
                    .await;
            }

            if let Err(err) = self
                .inventory
                .decrease_quantity(line.product_id, line.quantity)
                .await
            {
                return self.abort(&applied, err.into()).await;
            }
            applied.push((line.product_id, line.quantity));

            // Snapshot from the cart line, not the just-fetched product:
            // the price the user saw is the price they pay.
            order.push_item(OrderItem {
                id: 0,
                product_id: line.product_id,
                product_name: line.product_name.clone(),
                image_url: line.image_url.clone(),
                unit_price: line.price,
                quantity: line.quantity,
            });
        }

        let order = self.orders.insert(order).await?;

        if let Err(err) = self.carts.clear_cart(user_id).await {
            tracing::warn!(%user_id, error = %err, "failed to clear cart; order already placed");
        }

        metrics::histogram!("order_placement_duration_seconds")
            .record(start.elapsed().as_secs_f64());
        metrics::counter!("orders_placed_total").increment(1);
        tracing::info!(
            order_number = %order.order_number,
            total = %order.total_amount,
            "order placed"
        );
        Ok(order)
    }

    /// Returns all orders placed by a user.
    pub async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        self.orders.find_by_user(user_id).await
    }

    /// Looks an order up by its order number.
    pub async fn order_by_number(&self, number: &OrderNumber) -> Result<Order> {
        self.orders
            .find_by_number(number)
            .await?
            .ok_or_else(|| OrderFlowError::OrderNotFound(number.clone()))
    }

    /// Updates an order's status.
    ///
    /// A delivered order admits no further change. Cancelling an order
    /// that is not already cancelled returns every item to stock through
    /// independent, best-effort compensating increments; a failed
    /// increment is logged and blocks neither the remaining items nor the
    /// status change. No other transition performs side effects.
    #[tracing::instrument(skip(self))]
    pub async fn update_status(
        &self,
        number: &OrderNumber,
        new_status: OrderStatus,
    ) -> Result<Order> {
        let order = self.order_by_number(number).await?;

        if !order.status.can_update_to(new_status) {
            return Err(OrderFlowError::InvalidTransition {
                from: order.status,
                to: new_status,
            });
        }

        if new_status == OrderStatus::Cancelled && order.status != OrderStatus::Cancelled {
            self.restock(&order).await;
        }

        let updated = self.orders.set_status(number, new_status).await?;
        tracing::info!(order_number = %number, status = %new_status, "order status updated");
        Ok(updated)
    }

    /// Returns a cancelled order's items to stock, one independent
    /// increment per item.
    async fn restock(&self, order: &Order) {
        tracing::info!(
            order_number = %order.order_number,
            "order cancelled; returning items to stock"
        );
        for item in &order.order_items {
            match self
                .inventory
                .increase_quantity(item.product_id, item.quantity)
                .await
            {
                Ok(()) => {
                    metrics::counter!("stock_compensations_total").increment(1);
                }
                Err(err) => {
                    metrics::counter!("stock_compensation_failures_total").increment(1);
                    tracing::error!(
                        product_id = %item.product_id,
                        quantity = item.quantity,
                        error = %err,
                        "failed to restore stock during cancellation"
                    );
                }
            }
        }
    }

    /// Aborts a placement mid-pipeline. Already-applied decrements stay in
    /// place unless rollback is enabled.
    async fn abort(&self, applied: &[(ProductId, u32)], err: OrderFlowError) -> Result<Order> {
        metrics::counter!("order_placement_failures_total").increment(1);
        if self.rollback_on_failure && !applied.is_empty() {
            tracing::info!(count = applied.len(), "rolling back applied decrements");
            for (product_id, quantity) in applied.iter().rev() {
                if let Err(comp_err) = self.inventory.increase_quantity(*product_id, *quantity).await
                {
                    tracing::error!(
                        %product_id,
                        quantity,
                        error = %comp_err,
                        "rollback increment failed"
                    );
                }
            }
        }
        tracing::warn!(error = %err, "order placement aborted");
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryOrderRepository;
    use async_trait::async_trait;
    use common::Money;
    use domain::{Cart, Product, Role, UserDetails};
    use services::{
        CartStore, InMemoryIdentityService, InMemoryInventoryService, ServiceError,
    };
    use std::sync::{Arc, Mutex};

    type TestOrchestrator = OrderOrchestrator<
        CartStore<InMemoryInventoryService>,
        InMemoryIdentityService,
        InMemoryInventoryService,
        InMemoryOrderRepository,
    >;

    fn product(id: i64, cents: i64, quantity: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Money::from_cents(cents),
            quantity,
            image_url: None,
            brand: "Acme".to_string(),
            category: "Tools".to_string(),
        }
    }

    fn ana(id: i64) -> UserDetails {
        UserDetails {
            id: UserId::new(id),
            username: "ana".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Kovac".to_string(),
            email: "ana@example.com".to_string(),
            phone_number: "555-0101".to_string(),
            address: "5 Elm St".to_string(),
            role: Role::User,
        }
    }

    fn setup() -> (
        TestOrchestrator,
        CartStore<InMemoryInventoryService>,
        InMemoryInventoryService,
        InMemoryIdentityService,
    ) {
        let ledger = InMemoryInventoryService::new();
        let directory = InMemoryIdentityService::new();
        let carts = CartStore::new(ledger.clone());
        let orchestrator = OrderOrchestrator::new(
            carts.clone(),
            directory.clone(),
            ledger.clone(),
            InMemoryOrderRepository::new(),
        );
        (orchestrator, carts, ledger, directory)
    }

    #[tokio::test]
    async fn test_place_order_happy_path() {
        let (orchestrator, carts, ledger, directory) = setup();
        ledger.seed(product(5, 1000, 3));
        directory.seed(ana(1));
        carts
            .add_item(UserId::new(1), ProductId::new(5), 3)
            .await
            .unwrap();

        let order = orchestrator.place_order(UserId::new(1)).await.unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_amount.cents(), 3000);
        assert_eq!(order.order_items.len(), 1);
        assert_eq!(order.order_items[0].unit_price.cents(), 1000);
        assert_eq!(order.order_items[0].quantity, 3);
        assert_eq!(order.shipping.first_name, "Ana");
        assert_eq!(order.shipping.street, "5 Elm St");

        // Stock is decremented and the cart cleared.
        assert_eq!(ledger.quantity_of(ProductId::new(5)), Some(0));
        assert!(carts.get_cart(UserId::new(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_place_order_insufficient_stock() {
        let (orchestrator, carts, ledger, directory) = setup();
        ledger.seed(product(5, 1000, 5));
        directory.seed(ana(1));
        carts
            .add_item(UserId::new(1), ProductId::new(5), 5)
            .await
            .unwrap();
        // Another placement drains the shelf between add and checkout.
        ledger
            .decrease_quantity(ProductId::new(5), 3)
            .await
            .unwrap();

        let err = orchestrator.place_order(UserId::new(1)).await.unwrap_err();
        assert!(matches!(
            err,
            OrderFlowError::InsufficientStock {
                available: 2,
                requested: 5,
                ..
            }
        ));

        // No decrement happened and the cart is untouched.
        assert_eq!(ledger.quantity_of(ProductId::new(5)), Some(2));
        let cart = carts.get_cart(UserId::new(1)).await.unwrap().unwrap();
        assert_eq!(cart.item(ProductId::new(5)).unwrap().quantity, 5);
    }

    #[tokio::test]
    async fn test_place_order_empty_or_missing_cart() {
        let (orchestrator, carts, ledger, directory) = setup();
        ledger.seed(product(5, 1000, 3));
        directory.seed(ana(1));

        let err = orchestrator.place_order(UserId::new(1)).await.unwrap_err();
        assert!(matches!(err, OrderFlowError::EmptyCart(_)));

        // An existing but empty cart is rejected the same way.
        carts.get_or_create(UserId::new(1)).await;
        let err = orchestrator.place_order(UserId::new(1)).await.unwrap_err();
        assert!(matches!(err, OrderFlowError::EmptyCart(_)));
    }

    #[tokio::test]
    async fn test_place_order_unknown_user_touches_no_stock() {
        let (orchestrator, carts, ledger, _) = setup();
        ledger.seed(product(5, 1000, 3));
        carts
            .add_item(UserId::new(1), ProductId::new(5), 2)
            .await
            .unwrap();

        let err = orchestrator.place_order(UserId::new(1)).await.unwrap_err();
        assert!(matches!(err, OrderFlowError::UserNotFound(_)));
        // Identity is validated before any inventory is touched.
        assert_eq!(ledger.quantity_of(ProductId::new(5)), Some(3));
    }

    #[tokio::test]
    async fn test_order_honors_cart_price_over_live_price() {
        let (orchestrator, carts, ledger, directory) = setup();
        ledger.seed(product(5, 1000, 3));
        directory.seed(ana(1));
        carts
            .add_item(UserId::new(1), ProductId::new(5), 2)
            .await
            .unwrap();

        // Price rises after the item was added to the cart.
        ledger.set_price(ProductId::new(5), Money::from_cents(1500));

        let order = orchestrator.place_order(UserId::new(1)).await.unwrap();
        assert_eq!(order.order_items[0].unit_price.cents(), 1000);
        assert_eq!(order.total_amount.cents(), 2000);
    }

    #[tokio::test]
    async fn test_order_items_immutable_after_placement() {
        let (orchestrator, carts, ledger, directory) = setup();
        ledger.seed(product(5, 1000, 3));
        directory.seed(ana(1));
        carts
            .add_item(UserId::new(1), ProductId::new(5), 2)
            .await
            .unwrap();
        let order = orchestrator.place_order(UserId::new(1)).await.unwrap();

        ledger.set_price(ProductId::new(5), Money::from_cents(9999));

        let reloaded = orchestrator
            .order_by_number(&order.order_number)
            .await
            .unwrap();
        assert_eq!(reloaded.order_items[0].unit_price.cents(), 1000);
        assert_eq!(reloaded.total_amount.cents(), 2000);
    }

    #[tokio::test]
    async fn test_mid_saga_failure_keeps_earlier_decrements_by_default() {
        let (orchestrator, carts, ledger, directory) = setup();
        ledger.seed(product(5, 1000, 10));
        ledger.seed(product(6, 500, 1));
        directory.seed(ana(1));
        let user = UserId::new(1);
        carts.add_item(user, ProductId::new(5), 4).await.unwrap();
        carts.add_item(user, ProductId::new(6), 1).await.unwrap();
        // Second line is out of stock by checkout time.
        ledger.decrease_quantity(ProductId::new(6), 1).await.unwrap();

        let err = orchestrator.place_order(user).await.unwrap_err();
        assert!(matches!(err, OrderFlowError::InsufficientStock { .. }));

        // The first line's decrement is not undone.
        assert_eq!(ledger.quantity_of(ProductId::new(5)), Some(6));
        // And the cart survives for a retry.
        assert!(carts.get_cart(user).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_mid_saga_failure_rolls_back_when_enabled() {
        let ledger = InMemoryInventoryService::new();
        let directory = InMemoryIdentityService::new();
        let carts = CartStore::new(ledger.clone());
        let orchestrator = OrderOrchestrator::new(
            carts.clone(),
            directory.clone(),
            ledger.clone(),
            InMemoryOrderRepository::new(),
        )
        .with_rollback_on_failure(true);

        ledger.seed(product(5, 1000, 10));
        ledger.seed(product(6, 500, 1));
        directory.seed(ana(1));
        let user = UserId::new(1);
        carts.add_item(user, ProductId::new(5), 4).await.unwrap();
        carts.add_item(user, ProductId::new(6), 1).await.unwrap();
        ledger.decrease_quantity(ProductId::new(6), 1).await.unwrap();

        let err = orchestrator.place_order(user).await.unwrap_err();
        assert!(matches!(err, OrderFlowError::InsufficientStock { .. }));

        // The first line's decrement was compensated.
        assert_eq!(ledger.quantity_of(ProductId::new(5)), Some(10));
    }

    /// Cart seam whose clear always fails, standing in for a cart service
    /// outage after the order is committed.
    #[derive(Clone)]
    struct UnclearableCart {
        inner: CartStore<InMemoryInventoryService>,
    }

    #[async_trait]
    impl CartService for UnclearableCart {
        async fn get_cart(&self, user_id: UserId) -> services::error::Result<Option<Cart>> {
            self.inner.get_cart(user_id).await
        }

        async fn clear_cart(&self, _user_id: UserId) -> services::error::Result<()> {
            Err(ServiceError::Upstream("cart service down".to_string()))
        }
    }

    #[tokio::test]
    async fn test_cart_clear_failure_is_swallowed() {
        let ledger = InMemoryInventoryService::new();
        let directory = InMemoryIdentityService::new();
        let carts = CartStore::new(ledger.clone());
        let orchestrator = OrderOrchestrator::new(
            UnclearableCart {
                inner: carts.clone(),
            },
            directory.clone(),
            ledger.clone(),
            InMemoryOrderRepository::new(),
        );

        ledger.seed(product(5, 1000, 3));
        directory.seed(ana(1));
        carts
            .add_item(UserId::new(1), ProductId::new(5), 3)
            .await
            .unwrap();

        // The order is authoritative even though the clear failed.
        let order = orchestrator.place_order(UserId::new(1)).await.unwrap();
        assert_eq!(order.total_amount.cents(), 3000);
        assert_eq!(ledger.quantity_of(ProductId::new(5)), Some(0));
    }

    /// Ledger wrapper recording every compensating increment.
    #[derive(Clone)]
    struct RecordingLedger {
        inner: InMemoryInventoryService,
        increases: Arc<Mutex<Vec<(ProductId, u32)>>>,
    }

    #[async_trait]
    impl InventoryService for RecordingLedger {
        async fn get_product(
            &self,
            id: ProductId,
        ) -> services::error::Result<Option<Product>> {
            self.inner.get_product(id).await
        }

        async fn decrease_quantity(
            &self,
            id: ProductId,
            quantity: u32,
        ) -> services::error::Result<()> {
            self.inner.decrease_quantity(id, quantity).await
        }

        async fn increase_quantity(
            &self,
            id: ProductId,
            quantity: u32,
        ) -> services::error::Result<()> {
            self.increases.lock().unwrap().push((id, quantity));
            self.inner.increase_quantity(id, quantity).await
        }
    }

    async fn place_two_line_order(
        ledger: &InMemoryInventoryService,
        carts: &CartStore<InMemoryInventoryService>,
        directory: &InMemoryIdentityService,
        orchestrator: &OrderOrchestrator<
            CartStore<InMemoryInventoryService>,
            InMemoryIdentityService,
            RecordingLedger,
            InMemoryOrderRepository,
        >,
    ) -> Order {
        ledger.seed(product(5, 1000, 10));
        ledger.seed(product(6, 500, 10));
        directory.seed(ana(1));
        let user = UserId::new(1);
        carts.add_item(user, ProductId::new(5), 2).await.unwrap();
        carts.add_item(user, ProductId::new(6), 3).await.unwrap();
        orchestrator.place_order(user).await.unwrap()
    }

    fn recording_setup() -> (
        OrderOrchestrator<
            CartStore<InMemoryInventoryService>,
            InMemoryIdentityService,
            RecordingLedger,
            InMemoryOrderRepository,
        >,
        CartStore<InMemoryInventoryService>,
        InMemoryInventoryService,
        InMemoryIdentityService,
        Arc<Mutex<Vec<(ProductId, u32)>>>,
    ) {
        let ledger = InMemoryInventoryService::new();
        let increases = Arc::new(Mutex::new(Vec::new()));
        let recording = RecordingLedger {
            inner: ledger.clone(),
            increases: increases.clone(),
        };
        let directory = InMemoryIdentityService::new();
        let carts = CartStore::new(ledger.clone());
        let orchestrator = OrderOrchestrator::new(
            carts.clone(),
            directory.clone(),
            recording,
            InMemoryOrderRepository::new(),
        );
        (orchestrator, carts, ledger, directory, increases)
    }

    #[tokio::test]
    async fn test_cancellation_compensates_each_item_once() {
        let (orchestrator, carts, ledger, directory, increases) = recording_setup();
        let order = place_two_line_order(&ledger, &carts, &directory, &orchestrator).await;
        assert_eq!(ledger.quantity_of(ProductId::new(5)), Some(8));
        assert_eq!(ledger.quantity_of(ProductId::new(6)), Some(7));

        let cancelled = orchestrator
            .update_status(&order.order_number, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);

        // Exactly two compensating increments, one per item.
        assert_eq!(
            increases.lock().unwrap().as_slice(),
            &[(ProductId::new(5), 2), (ProductId::new(6), 3)]
        );
        assert_eq!(ledger.quantity_of(ProductId::new(5)), Some(10));
        assert_eq!(ledger.quantity_of(ProductId::new(6)), Some(10));

        // Re-cancelling performs no further compensation.
        orchestrator
            .update_status(&order.order_number, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(increases.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_compensation_failure_does_not_block_cancellation() {
        let (orchestrator, carts, ledger, directory, increases) = recording_setup();
        let order = place_two_line_order(&ledger, &carts, &directory, &orchestrator).await;

        ledger.set_fail_on_increase(true);
        let cancelled = orchestrator
            .update_status(&order.order_number, OrderStatus::Cancelled)
            .await
            .unwrap();

        // Both items were attempted and the status change completed even
        // though no stock came back.
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(increases.lock().unwrap().len(), 2);
        assert_eq!(ledger.quantity_of(ProductId::new(5)), Some(8));
    }

    #[tokio::test]
    async fn test_update_status_transitions() {
        let (orchestrator, carts, ledger, directory) = setup();
        ledger.seed(product(5, 1000, 3));
        directory.seed(ana(1));
        carts
            .add_item(UserId::new(1), ProductId::new(5), 1)
            .await
            .unwrap();
        let order = orchestrator.place_order(UserId::new(1)).await.unwrap();

        // Non-cancelling transitions perform no side effects.
        orchestrator
            .update_status(&order.order_number, OrderStatus::Processing)
            .await
            .unwrap();
        orchestrator
            .update_status(&order.order_number, OrderStatus::Shipped)
            .await
            .unwrap();
        assert_eq!(ledger.quantity_of(ProductId::new(5)), Some(2));

        orchestrator
            .update_status(&order.order_number, OrderStatus::Delivered)
            .await
            .unwrap();

        // A delivered order admits no further change.
        let err = orchestrator
            .update_status(&order.order_number, OrderStatus::Cancelled)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OrderFlowError::InvalidTransition {
                from: OrderStatus::Delivered,
                to: OrderStatus::Cancelled,
            }
        ));
        // No compensation ran for the rejected cancellation.
        assert_eq!(ledger.quantity_of(ProductId::new(5)), Some(2));
    }

    #[tokio::test]
    async fn test_update_status_unknown_order() {
        let (orchestrator, _, _, _) = setup();
        let err = orchestrator
            .update_status(&OrderNumber::new("missing"), OrderStatus::Shipped)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderFlowError::OrderNotFound(_)));
    }

    #[tokio::test]
    async fn test_orders_for_user_returns_own_orders() {
        let (orchestrator, carts, ledger, directory) = setup();
        ledger.seed(product(5, 1000, 10));
        directory.seed(ana(1));
        let mut bob = ana(2);
        bob.username = "bob".to_string();
        directory.seed(bob);

        carts
            .add_item(UserId::new(1), ProductId::new(5), 1)
            .await
            .unwrap();
        orchestrator.place_order(UserId::new(1)).await.unwrap();
        carts
            .add_item(UserId::new(2), ProductId::new(5), 2)
            .await
            .unwrap();
        orchestrator.place_order(UserId::new(2)).await.unwrap();

        let mine = orchestrator.orders_for_user(UserId::new(1)).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].user_id, UserId::new(1));
        assert!(orchestrator.orders_for_user(UserId::new(3)).await.unwrap().is_empty());
    }
}
