//! Order placement, query and status endpoints.

use std::sync::Arc;

use auth::{AdminUser, CurrentUser};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::{Money, OrderNumber, ProductId, UserId};
use domain::{Identity, Order, OrderStatus, ShippingDetails};
use orders::OrderRepository;
use serde::{Deserialize, Serialize};
use services::{CartService, IdentityService, InventoryService};

use crate::AppState;
use crate::error::ApiError;

// -- Response types --

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub id: i64,
    pub product_id: ProductId,
    pub product_name: String,
    pub image_url: Option<String>,
    pub unit_price: Money,
    pub quantity: u32,
    pub total_item_price: Money,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: i64,
    pub order_number: String,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub total_amount: Money,
    pub shipping: ShippingDetails,
    pub order_date: DateTime<Utc>,
    pub order_items: Vec<OrderItemResponse>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        OrderResponse {
            id: order.id,
            order_number: order.order_number.to_string(),
            user_id: order.user_id,
            status: order.status,
            total_amount: order.total_amount,
            shipping: order.shipping,
            order_date: order.order_date,
            order_items: order
                .order_items
                .into_iter()
                .map(|item| OrderItemResponse {
                    id: item.id,
                    product_id: item.product_id,
                    product_name: item.product_name.clone(),
                    image_url: item.image_url.clone(),
                    unit_price: item.unit_price,
                    quantity: item.quantity,
                    total_item_price: item.total_price(),
                })
                .collect(),
        }
    }
}

#[derive(Deserialize)]
pub struct StatusQuery {
    pub status: OrderStatus,
}

// -- Handlers --

/// POST /orders — place an order from the caller's cart.
#[tracing::instrument(skip_all, fields(user_id = %identity.user_id))]
pub async fn place<C, U, I, R>(
    State(state): State<Arc<AppState<C, U, I, R>>>,
    CurrentUser(identity): CurrentUser,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError>
where
    C: CartService + 'static,
    U: IdentityService + 'static,
    I: InventoryService + 'static,
    R: OrderRepository + 'static,
{
    let order = state.orchestrator.place_order(identity.user_id).await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

/// GET /orders — the caller's orders.
#[tracing::instrument(skip_all, fields(user_id = %identity.user_id))]
pub async fn list_mine<C, U, I, R>(
    State(state): State<Arc<AppState<C, U, I, R>>>,
    CurrentUser(identity): CurrentUser,
) -> Result<Json<Vec<OrderResponse>>, ApiError>
where
    C: CartService + 'static,
    U: IdentityService + 'static,
    I: InventoryService + 'static,
    R: OrderRepository + 'static,
{
    let orders = state.orchestrator.orders_for_user(identity.user_id).await?;
    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

/// GET /orders/{orderNumber} — one order, visible to its owner or an admin.
#[tracing::instrument(skip_all, fields(order_number = %order_number))]
pub async fn get_by_number<C, U, I, R>(
    State(state): State<Arc<AppState<C, U, I, R>>>,
    CurrentUser(identity): CurrentUser,
    Path(order_number): Path<String>,
) -> Result<Json<OrderResponse>, ApiError>
where
    C: CartService + 'static,
    U: IdentityService + 'static,
    I: InventoryService + 'static,
    R: OrderRepository + 'static,
{
    let order = state
        .orchestrator
        .order_by_number(&OrderNumber::new(order_number))
        .await?;
    authorize_order_access(&identity, &order)?;
    Ok(Json(order.into()))
}

/// PUT /orders/{orderNumber}/status?status=X — admin-only status update.
#[tracing::instrument(skip_all, fields(order_number = %order_number))]
pub async fn update_status<C, U, I, R>(
    State(state): State<Arc<AppState<C, U, I, R>>>,
    _admin: AdminUser,
    Path(order_number): Path<String>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<OrderResponse>, ApiError>
where
    C: CartService + 'static,
    U: IdentityService + 'static,
    I: InventoryService + 'static,
    R: OrderRepository + 'static,
{
    let order = state
        .orchestrator
        .update_status(&OrderNumber::new(order_number), query.status)
        .await?;
    Ok(Json(order.into()))
}

/// DELETE /orders/{orderNumber} — cancel the caller's own order.
#[tracing::instrument(skip_all, fields(order_number = %order_number))]
pub async fn cancel<C, U, I, R>(
    State(state): State<Arc<AppState<C, U, I, R>>>,
    CurrentUser(identity): CurrentUser,
    Path(order_number): Path<String>,
) -> Result<Json<OrderResponse>, ApiError>
where
    C: CartService + 'static,
    U: IdentityService + 'static,
    I: InventoryService + 'static,
    R: OrderRepository + 'static,
{
    let number = OrderNumber::new(order_number);
    let order = state.orchestrator.order_by_number(&number).await?;
    authorize_order_access(&identity, &order)?;

    let cancelled = state
        .orchestrator
        .update_status(&number, OrderStatus::Cancelled)
        .await?;
    Ok(Json(cancelled.into()))
}

fn authorize_order_access(identity: &Identity, order: &Order) -> Result<(), ApiError> {
    if identity.is_admin() || order.user_id == identity.user_id {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "You do not have access to this order".to_string(),
        ))
    }
}
