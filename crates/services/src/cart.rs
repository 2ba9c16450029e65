//! Cart store with stock-checked mutation.
//!
//! Stock checks here are advisory: they compare against the live count at
//! check time but never lock or decrement inventory. The actual decrement
//! happens only during order placement, so two concurrent adds for the
//! same product across different carts may both pass.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{ProductId, UserId};
use domain::{Cart, CartItem, Product};

use crate::error::{Result, ServiceError};
use crate::inventory::InventoryService;

/// The orchestrator-facing cart seam: fetch and clear.
#[async_trait]
pub trait CartService: Send + Sync {
    /// Fetches the user's cart. `None` when the user has no cart yet.
    async fn get_cart(&self, user_id: UserId) -> Result<Option<Cart>>;

    /// Deletes the user's cart. Fails with `CartNotFound` when none exists.
    async fn clear_cart(&self, user_id: UserId) -> Result<()>;
}

#[derive(Debug, Default)]
struct CartStoreState {
    carts: HashMap<UserId, Cart>,
    next_cart_id: i64,
    next_item_id: i64,
}

impl CartStoreState {
    fn get_or_create(&mut self, user_id: UserId) -> &mut Cart {
        match self.carts.entry(user_id) {
            std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
            std::collections::hash_map::Entry::Vacant(entry) => {
                self.next_cart_id += 1;
                entry.insert(Cart::empty(self.next_cart_id, user_id))
            }
        }
    }
}

/// In-memory cart store, one cart per user, created lazily on first access.
///
/// Generic over the inventory seam so stock checks always read the live
/// product record.
#[derive(Debug, Clone)]
pub struct CartStore<I> {
    inventory: I,
    state: Arc<RwLock<CartStoreState>>,
}

impl<I: InventoryService> CartStore<I> {
    /// Creates an empty cart store backed by the given inventory service.
    pub fn new(inventory: I) -> Self {
        Self {
            inventory,
            state: Arc::new(RwLock::new(CartStoreState::default())),
        }
    }

    /// Returns the user's cart, creating an empty one if none exists.
    pub async fn get_or_create(&self, user_id: UserId) -> Cart {
        let mut state = self.state.write().unwrap();
        state.get_or_create(user_id).clone()
    }

    /// Adds `quantity` of a product to the user's cart.
    ///
    /// The live product is fetched for the stock check and the price/name
    /// snapshot. When the product is already in the cart the quantities are
    /// summed and the summed total is re-checked against live stock.
    #[tracing::instrument(skip(self))]
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Cart> {
        let product = self.fetch_product(product_id).await?;

        let mut state = self.state.write().unwrap();
        state.next_item_id += 1;
        let item_id = state.next_item_id;
        let cart = state.get_or_create(user_id);

        if let Some(item) = cart.item_mut(product_id) {
            let combined = item.quantity + quantity;
            if !product.has_stock_for(combined) {
                return Err(ServiceError::InsufficientStock {
                    product_name: product.name,
                    available: product.quantity,
                    requested: combined,
                });
            }
            item.quantity = combined;
        } else {
            if !product.has_stock_for(quantity) {
                return Err(ServiceError::InsufficientStock {
                    product_name: product.name,
                    available: product.quantity,
                    requested: quantity,
                });
            }
            cart.items.push(CartItem {
                id: item_id,
                product_id,
                product_name: product.name,
                image_url: product.image_url,
                price: product.price,
                quantity,
            });
        }

        cart.updated_at = chrono::Utc::now();
        Ok(cart.clone())
    }

    /// Sets the quantity of a product already in the cart.
    ///
    /// A new quantity of zero or below removes the line instead of storing
    /// a non-positive quantity; otherwise the new quantity is re-validated
    /// against live stock.
    #[tracing::instrument(skip(self))]
    pub async fn update_item_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        new_quantity: i64,
    ) -> Result<Cart> {
        // Existence checks come first so a stale cart reference fails
        // before any inventory round trip.
        {
            let state = self.state.read().unwrap();
            let cart = state
                .carts
                .get(&user_id)
                .ok_or(ServiceError::CartNotFound(user_id))?;
            cart.item(product_id)
                .ok_or(ServiceError::ItemNotFound(product_id))?;
        }

        if new_quantity <= 0 {
            return self.remove_and_return(user_id, product_id);
        }

        // Values beyond u32 can never pass the stock check anyway.
        let quantity = u32::try_from(new_quantity).unwrap_or(u32::MAX);
        let product = self.fetch_product(product_id).await?;
        if !product.has_stock_for(quantity) {
            return Err(ServiceError::InsufficientStock {
                product_name: product.name,
                available: product.quantity,
                requested: quantity,
            });
        }

        let mut state = self.state.write().unwrap();
        let cart = state
            .carts
            .get_mut(&user_id)
            .ok_or(ServiceError::CartNotFound(user_id))?;
        let item = cart
            .item_mut(product_id)
            .ok_or(ServiceError::ItemNotFound(product_id))?;
        item.quantity = quantity;
        cart.updated_at = chrono::Utc::now();
        Ok(cart.clone())
    }

    /// Removes a product from the user's cart.
    #[tracing::instrument(skip(self))]
    pub async fn remove_item(&self, user_id: UserId, product_id: ProductId) -> Result<()> {
        self.remove_and_return(user_id, product_id).map(|_| ())
    }

    fn remove_and_return(&self, user_id: UserId, product_id: ProductId) -> Result<Cart> {
        let mut state = self.state.write().unwrap();
        let cart = state
            .carts
            .get_mut(&user_id)
            .ok_or(ServiceError::CartNotFound(user_id))?;
        if !cart.remove_item(product_id) {
            return Err(ServiceError::ItemNotFound(product_id));
        }
        cart.updated_at = chrono::Utc::now();
        Ok(cart.clone())
    }

    async fn fetch_product(&self, product_id: ProductId) -> Result<Product> {
        self.inventory
            .get_product(product_id)
            .await?
            .ok_or(ServiceError::ProductNotFound(product_id))
    }
}

#[async_trait]
impl<I: InventoryService> CartService for CartStore<I> {
    async fn get_cart(&self, user_id: UserId) -> Result<Option<Cart>> {
        Ok(self.state.read().unwrap().carts.get(&user_id).cloned())
    }

    async fn clear_cart(&self, user_id: UserId) -> Result<()> {
        let mut state = self.state.write().unwrap();
        state
            .carts
            .remove(&user_id)
            .map(|_| ())
            .ok_or(ServiceError::CartNotFound(user_id))
    }
}
