//! OAuth2 client credentials.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use nexthink_core::Region;

use crate::error::AuthError;

/// Maximum length of an instance name.
const MAX_INSTANCE_LEN: usize = 100;

/// Client credentials for one Nexthink instance.
///
/// The secret is never printed: `Debug` redacts it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    client_id: String,
    client_secret: String,
    instance: String,
    region: Region,
}

impl Credential {
    /// Creates a credential.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        instance: impl Into<String>,
        region: Region,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            instance: instance.into(),
            region,
        }
    }

    /// OAuth2 client id.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Instance name.
    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Hosting region.
    pub fn region(&self) -> Region {
        self.region
    }

    /// Checks that every field is present and the instance name is usable
    /// in a hostname.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.client_id.is_empty() {
            return Err(AuthError::InvalidCredential("client ID cannot be empty".into()));
        }
        if self.client_secret.is_empty() {
            return Err(AuthError::InvalidCredential("client secret cannot be empty".into()));
        }
        if self.instance.is_empty() {
            return Err(AuthError::InvalidCredential("instance cannot be empty".into()));
        }
        if self.instance.contains(' ') {
            return Err(AuthError::InvalidCredential(
                "instance name cannot contain spaces".into(),
            ));
        }
        if self.instance.len() > MAX_INSTANCE_LEN {
            return Err(AuthError::InvalidCredential(format!(
                "instance name too long (max {MAX_INSTANCE_LEN} characters)"
            )));
        }
        Ok(())
    }

    /// Default token endpoint for this instance.
    pub fn token_url(&self) -> String {
        self.region.token_url(&self.instance)
    }

    /// Default API base URL for this instance.
    pub fn api_base_url(&self) -> String {
        self.region.api_base_url(&self.instance)
    }

    /// Value of the `Authorization` header for the token request.
    pub fn basic_auth_header(&self) -> String {
        let encoded = STANDARD.encode(format!("{}:{}", self.client_id, self.client_secret));
        format!("Basic {encoded}")
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("instance", &self.instance)
            .field("region", &self.region)
            .finish()
    }
}
