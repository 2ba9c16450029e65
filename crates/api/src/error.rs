//! API error types with HTTP response mapping.

use auth::AuthError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use orders::OrderFlowError;
use services::ServiceError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// The caller's role or ownership does not grant access.
    Forbidden(String),
    /// Order workflow error.
    Flow(OrderFlowError),
    /// Token error.
    Auth(AuthError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::Flow(err) => flow_error_to_response(err),
            ApiError::Auth(err) => auth_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn flow_error_to_response(err: OrderFlowError) -> (StatusCode, String) {
    let status = match &err {
        OrderFlowError::EmptyCart(_) => StatusCode::BAD_REQUEST,
        OrderFlowError::UserNotFound(_)
        | OrderFlowError::ProductNotFound(_)
        | OrderFlowError::OrderNotFound(_) => StatusCode::NOT_FOUND,
        OrderFlowError::InsufficientStock { .. } | OrderFlowError::InvalidTransition { .. } => {
            StatusCode::CONFLICT
        }
        OrderFlowError::Service(service_err) => match service_err {
            ServiceError::ProductNotFound(_)
            | ServiceError::CartNotFound(_)
            | ServiceError::ItemNotFound(_)
            | ServiceError::UserNotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::InsufficientStock { .. } => StatusCode::CONFLICT,
            ServiceError::Upstream(_) => StatusCode::BAD_GATEWAY,
        },
    };
    (status, err.to_string())
}

fn auth_error_to_response(err: AuthError) -> (StatusCode, String) {
    let status = match &err {
        AuthError::Expired
        | AuthError::BadSignature
        | AuthError::Malformed
        | AuthError::UnknownSubject(_) => StatusCode::UNAUTHORIZED,
        AuthError::IdentityLookup(_) => StatusCode::BAD_GATEWAY,
        AuthError::Encoding(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}

impl From<OrderFlowError> for ApiError {
    fn from(err: OrderFlowError) -> Self {
        ApiError::Flow(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}
