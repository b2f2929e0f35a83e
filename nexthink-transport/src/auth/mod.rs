//! OAuth2 client-credentials authentication.
//!
//! - [`credential`] - Client id, secret, instance and region
//! - [`store`] - Single-slot token cache
//! - [`manager`] - Token lifecycle: reuse, refresh, invalidate

pub mod credential;
pub mod manager;
pub mod store;

pub use credential::Credential;
pub use manager::{DEFAULT_REFRESH_MARGIN, DEFAULT_SCOPE, TokenManager};
pub use store::{Token, TokenStore};
