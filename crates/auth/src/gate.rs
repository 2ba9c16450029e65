//! Per-request authorization gate.
//!
//! The [`authenticate`] middleware turns a bearer token into a verified
//! [`Identity`] attached to the request's extensions. Handlers opt into
//! authorization through the [`CurrentUser`] and [`AdminUser`] extractors;
//! routes without them stay open.

use std::sync::Arc;

use axum::Json;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::{Method, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use domain::Identity;

use crate::token::TokenService;

/// Middleware: verify the bearer token, if any, and attach the caller's
/// identity to the request.
///
/// CORS preflight requests bypass verification entirely. A missing or
/// invalid token leaves the request anonymous — endpoints that require an
/// identity reject it downstream, so public routes keep working without
/// credentials.
pub async fn authenticate(
    State(tokens): State<Arc<TokenService>>,
    mut request: Request,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS {
        return next.run(request).await;
    }

    let bearer = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    if let Some(token) = bearer {
        match tokens.verify(token) {
            Ok(claims) => {
                request.extensions_mut().insert(Identity::from(claims));
            }
            Err(err) => {
                tracing::debug!(error = %err, "rejected bearer token");
            }
        }
    }

    next.run(request).await
}

/// Rejection produced by the gate extractors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRejection {
    /// No verified identity is attached to the request.
    Unauthorized,

    /// The caller's role does not grant access to this operation.
    Forbidden,
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            GateRejection::Unauthorized => (StatusCode::UNAUTHORIZED, "Authentication required"),
            GateRejection::Forbidden => (StatusCode::FORBIDDEN, "Access denied"),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Extracts the request's verified identity, rejecting with 401 when the
/// request is anonymous.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = GateRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(CurrentUser)
            .ok_or(GateRejection::Unauthorized)
    }
}

/// Extracts the request's verified identity and requires the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Identity);

impl<S: Send + Sync> FromRequestParts<S> for AdminUser {
    type Rejection = GateRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(identity) = CurrentUser::from_request_parts(parts, state).await?;
        if !identity.is_admin() {
            return Err(GateRejection::Forbidden);
        }
        Ok(AdminUser(identity))
    }
}
