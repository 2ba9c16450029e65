//! Token issue, verification and refresh.

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;

use domain::UserDetails;
use services::UserDirectory;

use crate::claims::{AccessClaims, RefreshClaims};
use crate::error::AuthError;

/// An access/refresh token pair as returned on login and refresh.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issues and verifies HMAC-signed claims tokens.
///
/// Shared by every component's authorization gate, so token handling is
/// defined in exactly one place. Verification has zero expiry leeway:
/// a token is rejected the second its `exp` passes.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenService {
    /// Creates a token service from the shared symmetric secret and the
    /// access/refresh validity windows in seconds.
    pub fn new(secret: &str, access_ttl_secs: i64, refresh_ttl_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            access_ttl_secs,
            refresh_ttl_secs,
        }
    }

    /// Issues an access/refresh token pair for a user.
    ///
    /// The access token embeds the user id and role; the refresh token
    /// carries only the subject and its validity window.
    pub fn issue(&self, user: &UserDetails) -> Result<TokenPair, AuthError> {
        let now = Utc::now().timestamp();
        let access_token = self.encode(&AccessClaims {
            sub: user.username.clone(),
            user_id: user.id.as_i64(),
            role: user.role,
            iat: now,
            exp: now + self.access_ttl_secs,
        })?;
        let refresh_token = self.encode(&RefreshClaims {
            sub: user.username.clone(),
            iat: now,
            exp: now + self.refresh_ttl_secs,
        })?;
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Verifies an access token and returns its claims.
    pub fn verify(&self, token: &str) -> Result<AccessClaims, AuthError> {
        self.decode(token)
    }

    /// Verifies a refresh token and returns its claims.
    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, AuthError> {
        self.decode(token)
    }

    /// Issues a fresh access token from a refresh token.
    ///
    /// The subject is re-resolved against the authoritative user record so
    /// role or profile changes since login are picked up.
    pub async fn refresh(
        &self,
        refresh_token: &str,
        directory: &dyn UserDirectory,
    ) -> Result<String, AuthError> {
        let claims = self.verify_refresh(refresh_token)?;
        let user = directory
            .find_by_username(&claims.sub)
            .await
            .map_err(|e| AuthError::IdentityLookup(e.to_string()))?
            .ok_or_else(|| AuthError::UnknownSubject(claims.sub.clone()))?;

        let now = Utc::now().timestamp();
        self.encode(&AccessClaims {
            sub: user.username.clone(),
            user_id: user.id.as_i64(),
            role: user.role,
            iat: now,
            exp: now + self.access_ttl_secs,
        })
    }

    fn encode<T: serde::Serialize>(&self, claims: &T) -> Result<String, AuthError> {
        jsonwebtoken::encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| AuthError::Encoding(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<T, AuthError> {
        match jsonwebtoken::decode::<T>(token, &self.decoding, &self.validation) {
            Ok(data) => Ok(data.claims),
            Err(err) => Err(self.classify(token, &err)),
        }
    }

    /// Maps a decode failure onto the error taxonomy. Expiry dominates:
    /// a token whose `exp` has passed reads as expired even when its
    /// signature does not match.
    fn classify(&self, token: &str, err: &jsonwebtoken::errors::Error) -> AuthError {
        match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::InvalidSignature if self.expired_ignoring_signature(token) => {
                AuthError::Expired
            }
            ErrorKind::InvalidSignature => AuthError::BadSignature,
            _ => AuthError::Malformed,
        }
    }

    fn expired_ignoring_signature(&self, token: &str) -> bool {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.insecure_disable_signature_validation();
        matches!(
            jsonwebtoken::decode::<serde_json::Value>(token, &self.decoding, &validation),
            Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature)
        )
    }
}
