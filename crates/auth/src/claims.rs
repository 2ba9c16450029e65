//! Claims embedded in the tokens issued by the token service.

use common::UserId;
use domain::{Identity, Role};
use serde::{Deserialize, Serialize};

/// Claims of a short-lived access token.
///
/// Carries enough to authorize a request without any lookup: the subject
/// (username), the numeric user id and the role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Standard subject claim — set to the username.
    pub sub: String,

    /// Numeric user id.
    #[serde(rename = "userId")]
    pub user_id: i64,

    /// Role granted to the account at issue time.
    pub role: Role,

    /// Issued-at (Unix timestamp, seconds).
    pub iat: i64,

    /// Expiry (Unix timestamp, seconds).
    pub exp: i64,
}

/// Claims of a long-lived refresh token: subject and validity window only.
/// Identity attributes are re-derived from the authoritative user record
/// when a new access token is issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Standard subject claim — set to the username.
    pub sub: String,

    /// Issued-at (Unix timestamp, seconds).
    pub iat: i64,

    /// Expiry (Unix timestamp, seconds).
    pub exp: i64,
}

impl From<AccessClaims> for Identity {
    fn from(claims: AccessClaims) -> Self {
        Identity {
            user_id: UserId::new(claims.user_id),
            username: claims.sub,
            role: claims.role,
        }
    }
}
