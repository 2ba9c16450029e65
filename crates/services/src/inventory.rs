//! Inventory ledger trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{Money, ProductId};
use domain::Product;

use crate::error::{Result, ServiceError};

/// Trait for the inventory ledger owning product stock counts.
///
/// Increments and decrements are atomic per product; a decrement is
/// rejected outright when live stock is insufficient, so a stock count can
/// never go negative even when two callers race past their own checks.
#[async_trait]
pub trait InventoryService: Send + Sync {
    /// Fetches the live product record. `None` when the product is unknown.
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>>;

    /// Atomically decrements stock by `quantity`.
    async fn decrease_quantity(&self, id: ProductId, quantity: u32) -> Result<()>;

    /// Atomically increments stock by `quantity` (compensation path).
    async fn increase_quantity(&self, id: ProductId, quantity: u32) -> Result<()>;
}

#[derive(Debug, Default)]
struct LedgerState {
    products: HashMap<ProductId, Product>,
    fail_on_decrease: bool,
    fail_on_increase: bool,
}

/// In-memory inventory ledger for the single-process deployment and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInventoryService {
    state: Arc<RwLock<LedgerState>>,
}

impl InMemoryInventoryService {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a product record.
    pub fn seed(&self, product: Product) {
        let mut state = self.state.write().unwrap();
        state.products.insert(product.id, product);
    }

    /// Returns the current stock count for a product.
    pub fn quantity_of(&self, id: ProductId) -> Option<u32> {
        self.state
            .read()
            .unwrap()
            .products
            .get(&id)
            .map(|p| p.quantity)
    }

    /// Replaces a product's price, leaving stock untouched.
    pub fn set_price(&self, id: ProductId, price: Money) {
        if let Some(product) = self.state.write().unwrap().products.get_mut(&id) {
            product.price = price;
        }
    }

    /// Configures the ledger to fail decrements, simulating an outage.
    pub fn set_fail_on_decrease(&self, fail: bool) {
        self.state.write().unwrap().fail_on_decrease = fail;
    }

    /// Configures the ledger to fail increments, simulating an outage
    /// during compensation.
    pub fn set_fail_on_increase(&self, fail: bool) {
        self.state.write().unwrap().fail_on_increase = fail;
    }
}

#[async_trait]
impl InventoryService for InMemoryInventoryService {
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.state.read().unwrap().products.get(&id).cloned())
    }

    async fn decrease_quantity(&self, id: ProductId, quantity: u32) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_decrease {
            return Err(ServiceError::Upstream("inventory unavailable".to_string()));
        }

        let product = state
            .products
            .get_mut(&id)
            .ok_or(ServiceError::ProductNotFound(id))?;

        if product.quantity < quantity {
            return Err(ServiceError::InsufficientStock {
                product_name: product.name.clone(),
                available: product.quantity,
                requested: quantity,
            });
        }

        product.quantity -= quantity;
        Ok(())
    }

    async fn increase_quantity(&self, id: ProductId, quantity: u32) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_increase {
            return Err(ServiceError::Upstream("inventory unavailable".to_string()));
        }

        let product = state
            .products
            .get_mut(&id)
            .ok_or(ServiceError::ProductNotFound(id))?;

        product.quantity += quantity;
        Ok(())
    }
}
