//! Token refresh endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use orders::OrderRepository;
use serde::{Deserialize, Serialize};
use services::{CartService, IdentityService, InventoryService};

use crate::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub token: String,
    pub refresh_token: String,
}

/// POST /auth/refresh — issue a fresh access token from a refresh token.
///
/// The refresh token itself stays valid and is echoed back.
#[tracing::instrument(skip(state, request))]
pub async fn refresh<C, U, I, R>(
    State(state): State<Arc<AppState<C, U, I, R>>>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, ApiError>
where
    C: CartService + 'static,
    U: IdentityService + 'static,
    I: InventoryService + 'static,
    R: OrderRepository + 'static,
{
    let directory = state.directory.as_ref().ok_or_else(|| {
        ApiError::NotFound("Token refresh is served by the identity deployment".to_string())
    })?;

    let token = state
        .tokens
        .refresh(&request.refresh_token, directory.as_ref())
        .await?;
    Ok(Json(RefreshResponse {
        token,
        refresh_token: request.refresh_token,
    }))
}
