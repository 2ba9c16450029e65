//! Authentication error types.

use thiserror::Error;

/// Errors raised while issuing or verifying claims tokens.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token's expiry is in the past.
    #[error("Token has expired")]
    Expired,

    /// The token's signature does not match the shared secret.
    #[error("Token signature does not match")]
    BadSignature,

    /// The token could not be parsed or is missing required claims.
    #[error("Malformed token")]
    Malformed,

    /// A refresh token's subject no longer resolves to a user.
    #[error("Unknown token subject: {0}")]
    UnknownSubject(String),

    /// The identity service could not be reached during refresh.
    #[error("Identity lookup failed: {0}")]
    IdentityLookup(String),

    /// Token encoding failed.
    #[error("Token encoding failed: {0}")]
    Encoding(String),
}
