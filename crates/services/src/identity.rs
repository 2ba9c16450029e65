//! Identity service traits and in-memory user directory.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::UserId;
use domain::UserDetails;

use crate::error::Result;

/// The orchestrator-facing identity seam: profile lookup by user id.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Fetches the user's profile record. `None` when the id is unknown.
    async fn user_details(&self, user_id: UserId) -> Result<Option<UserDetails>>;
}

/// Authoritative user lookup by token subject, used when re-issuing
/// access tokens from a refresh token.
///
/// Only the identity deployment itself holds the directory; the other
/// services never resolve subjects.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolves a username to the authoritative user record.
    async fn find_by_username(&self, username: &str) -> Result<Option<UserDetails>>;
}

/// In-memory user directory for the single-process deployment and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdentityService {
    users: Arc<RwLock<HashMap<UserId, UserDetails>>>,
}

impl InMemoryIdentityService {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a user record.
    pub fn seed(&self, user: UserDetails) {
        self.users.write().unwrap().insert(user.id, user);
    }
}

#[async_trait]
impl IdentityService for InMemoryIdentityService {
    async fn user_details(&self, user_id: UserId) -> Result<Option<UserDetails>> {
        Ok(self.users.read().unwrap().get(&user_id).cloned())
    }
}

#[async_trait]
impl UserDirectory for InMemoryIdentityService {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserDetails>> {
        Ok(self
            .users
            .read()
            .unwrap()
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::Role;

    fn alice() -> UserDetails {
        UserDetails {
            id: UserId::new(1),
            username: "alice".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Horvat".to_string(),
            email: "alice@example.com".to_string(),
            phone_number: "555-0100".to_string(),
            address: "12 Main St".to_string(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn test_lookup_by_id_and_username() {
        let directory = InMemoryIdentityService::new();
        directory.seed(alice());

        let by_id = directory.user_details(UserId::new(1)).await.unwrap();
        assert_eq!(by_id.unwrap().username, "alice");

        let by_name = directory.find_by_username("alice").await.unwrap();
        assert_eq!(by_name.unwrap().id, UserId::new(1));
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let directory = InMemoryIdentityService::new();
        assert!(
            directory
                .user_details(UserId::new(9))
                .await
                .unwrap()
                .is_none()
        );
        assert!(directory.find_by_username("bob").await.unwrap().is_none());
    }
}
