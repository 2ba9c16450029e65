//! Application configuration loaded from environment variables.

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` / `PORT` — bind address (default `0.0.0.0:3000`)
/// - `JWT_SECRET` — shared symmetric token secret
/// - `JWT_ACCESS_TTL_SECS` / `JWT_REFRESH_TTL_SECS` — token validity
///   windows (defaults: 24 hours and 7 days)
/// - `ORDER_ROLLBACK_ON_FAILURE` — compensate already-applied decrements
///   when a later placement step fails (default `false`)
/// - `UPSTREAM_TIMEOUT_SECS` — per-request collaborator timeout
/// - `PRODUCT_SERVICE_URL` / `CART_SERVICE_URL` / `IDENTITY_SERVICE_URL` —
///   when all three are set the server runs against remote collaborators
///   instead of the in-process ones
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
    pub rollback_on_failure: bool,
    pub upstream_timeout_secs: u64,
    pub product_service_url: Option<String>,
    pub cart_service_url: Option<String>,
    pub identity_service_url: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            jwt_secret: std::env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            access_ttl_secs: std::env::var("JWT_ACCESS_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.access_ttl_secs),
            refresh_ttl_secs: std::env::var("JWT_REFRESH_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.refresh_ttl_secs),
            rollback_on_failure: std::env::var("ORDER_ROLLBACK_ON_FAILURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.rollback_on_failure),
            upstream_timeout_secs: std::env::var("UPSTREAM_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.upstream_timeout_secs),
            product_service_url: std::env::var("PRODUCT_SERVICE_URL").ok(),
            cart_service_url: std::env::var("CART_SERVICE_URL").ok(),
            identity_service_url: std::env::var("IDENTITY_SERVICE_URL").ok(),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the collaborator base URLs when the server is configured
    /// for remote deployment — all three must be set.
    pub fn remote_services(&self) -> Option<(&str, &str, &str)> {
        match (
            self.product_service_url.as_deref(),
            self.cart_service_url.as_deref(),
            self.identity_service_url.as_deref(),
        ) {
            (Some(product), Some(cart), Some(identity)) => Some((product, cart, identity)),
            _ => None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            jwt_secret: "dev-only-secret-override-me".to_string(),
            access_ttl_secs: 86_400,
            refresh_ttl_secs: 604_800,
            rollback_on_failure: false,
            upstream_timeout_secs: 10,
            product_service_url: None,
            cart_service_url: None,
            identity_service_url: None,
        }
    }
}
