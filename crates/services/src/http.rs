//! HTTP clients for remotely deployed collaborators.
//!
//! Each client speaks the inter-service wire contract and implements the
//! same trait as its in-memory counterpart, so the orchestrator does not
//! know which deployment it is talking to. Every request carries a finite
//! timeout; timeouts and transport failures surface as
//! [`ServiceError::Upstream`].

use std::time::Duration;

use async_trait::async_trait;
use common::{ProductId, UserId};
use domain::{Cart, CartItem, Product, UserDetails};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::cart::CartService;
use crate::error::{Result, ServiceError};
use crate::identity::IdentityService;
use crate::inventory::InventoryService;

fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder().timeout(timeout).build()
}

fn upstream(err: reqwest::Error) -> ServiceError {
    ServiceError::Upstream(err.to_string())
}

async fn unexpected_status(endpoint: &str, response: reqwest::Response) -> ServiceError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    ServiceError::Upstream(format!("{endpoint} returned {status}: {body}"))
}

/// Client for a remote inventory (product) service.
#[derive(Debug, Clone)]
pub struct HttpInventoryService {
    client: Client,
    base_url: String,
}

impl HttpInventoryService {
    /// Creates a client for the product service at `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.into(),
        })
    }

    async fn adjust(&self, op: &str, id: ProductId, quantity: u32) -> Result<()> {
        let url = format!(
            "{}/products/{op}/{id}?quantity={quantity}",
            self.base_url
        );
        let response = self.client.post(&url).send().await.map_err(upstream)?;
        match response.status() {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(ServiceError::ProductNotFound(id)),
            _ => Err(unexpected_status(op, response).await),
        }
    }
}

#[async_trait]
impl InventoryService for HttpInventoryService {
    #[tracing::instrument(skip(self))]
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        let url = format!("{}/products/{id}", self.base_url);
        let response = self.client.get(&url).send().await.map_err(upstream)?;
        match response.status() {
            s if s.is_success() => Ok(Some(response.json().await.map_err(upstream)?)),
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(unexpected_status("get product", response).await),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn decrease_quantity(&self, id: ProductId, quantity: u32) -> Result<()> {
        self.adjust("decrease-quantity", id, quantity).await
    }

    #[tracing::instrument(skip(self))]
    async fn increase_quantity(&self, id: ProductId, quantity: u32) -> Result<()> {
        self.adjust("increase-quantity", id, quantity).await
    }
}

/// Wire payload of the cart service; timestamps stay with the owning
/// service.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartPayload {
    id: i64,
    user_id: UserId,
    items: Vec<CartItem>,
}

/// Client for a remote cart service.
#[derive(Debug, Clone)]
pub struct HttpCartService {
    client: Client,
    base_url: String,
}

impl HttpCartService {
    /// Creates a client for the cart service at `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl CartService for HttpCartService {
    #[tracing::instrument(skip(self))]
    async fn get_cart(&self, user_id: UserId) -> Result<Option<Cart>> {
        let url = format!("{}/cart?userId={user_id}", self.base_url);
        let response = self.client.get(&url).send().await.map_err(upstream)?;
        match response.status() {
            s if s.is_success() => {
                let payload: CartPayload = response.json().await.map_err(upstream)?;
                Ok(Some(Cart::from_parts(payload.id, payload.user_id, payload.items)))
            }
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(unexpected_status("get cart", response).await),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn clear_cart(&self, user_id: UserId) -> Result<()> {
        let url = format!("{}/cart/clear?userId={user_id}", self.base_url);
        let response = self.client.delete(&url).send().await.map_err(upstream)?;
        match response.status() {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(ServiceError::CartNotFound(user_id)),
            _ => Err(unexpected_status("clear cart", response).await),
        }
    }
}

/// Client for a remote identity service.
#[derive(Debug, Clone)]
pub struct HttpIdentityService {
    client: Client,
    base_url: String,
}

impl HttpIdentityService {
    /// Creates a client for the identity service at `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl IdentityService for HttpIdentityService {
    #[tracing::instrument(skip(self))]
    async fn user_details(&self, user_id: UserId) -> Result<Option<UserDetails>> {
        let url = format!("{}/users/{user_id}/details", self.base_url);
        let response = self.client.get(&url).send().await.map_err(upstream)?;
        match response.status() {
            s if s.is_success() => Ok(Some(response.json().await.map_err(upstream)?)),
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(unexpected_status("user details", response).await),
        }
    }
}
