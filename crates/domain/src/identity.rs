//! Caller identity derived from a verified claims token.

use common::UserId;
use serde::{Deserialize, Serialize};

/// Role granted to a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Regular customer.
    #[default]
    User,

    /// Store administrator.
    Admin,
}

impl Role {
    /// Returns the role name as it appears in token claims.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The verified identity of the caller for the duration of one request.
///
/// Built by the authorization gate from token claims and passed explicitly
/// through the request's extension context — never stored in shared or
/// process-wide state, so concurrent requests cannot observe each other's
/// identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
}

impl Identity {
    /// Returns true if the caller holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Profile record owned by the identity service.
///
/// This is the `/users/{id}/details` response shape; the role is carried
/// alongside so tokens can be re-issued from the authoritative record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetails {
    pub id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    #[serde(default)]
    pub role: Role,
}
