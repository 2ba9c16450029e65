//! Stateless claims-token scheme and the per-request authorization gate.
//!
//! Every component establishes caller identity the same way: a signed
//! bearer token is verified by the [`TokenService`] and turned into a
//! request-scoped [`domain::Identity`] by the gate middleware. No shared
//! session state exists anywhere; validity is a pure function of the
//! token's signature and expiry.

mod claims;
mod error;
mod gate;
mod token;

pub use claims::{AccessClaims, RefreshClaims};
pub use error::AuthError;
pub use gate::{AdminUser, CurrentUser, GateRejection, authenticate};
pub use token::{TokenPair, TokenService};
