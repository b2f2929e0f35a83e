//! OAuth2 token lifecycle.
//!
//! [`TokenManager`] serves a bearer token to any number of concurrent
//! callers. A cached token is reused until it comes within the refresh
//! margin of its expiry; then exactly one caller contacts the token endpoint
//! while the others wait on the store lock and pick up the result.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, header};
use tracing::{debug, info, instrument, warn};

use super::credential::Credential;
use super::store::{Token, TokenSlot, TokenStore};
use crate::error::AuthError;

/// Default OAuth2 scope.
pub const DEFAULT_SCOPE: &str = "service:integration";

/// Default time before expiry at which a token is refreshed.
pub const DEFAULT_REFRESH_MARGIN: Duration = Duration::from_secs(120);

const GRANT_TYPE: &str = "client_credentials";

/// Obtains and caches access tokens for one credential.
#[derive(Debug)]
pub struct TokenManager {
    credential: Credential,
    token_url: String,
    scope: String,
    refresh_margin: Duration,
    http: Client,
    store: TokenStore,
}

impl TokenManager {
    /// Creates a manager that requests tokens with `http`.
    ///
    /// The token URL is derived from the credential and the scope defaults to
    /// [`DEFAULT_SCOPE`].
    pub fn new(credential: Credential, http: Client) -> Self {
        Self {
            token_url: credential.token_url(),
            credential,
            scope: DEFAULT_SCOPE.to_string(),
            refresh_margin: DEFAULT_REFRESH_MARGIN,
            http,
            store: TokenStore::new(),
        }
    }

    /// Overrides the token endpoint.
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Overrides the requested scope.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Overrides the refresh margin.
    pub fn with_refresh_margin(mut self, margin: Duration) -> Self {
        self.refresh_margin = margin;
        self
    }

    /// Token endpoint in use.
    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// Returns a usable access token, refreshing it if needed.
    ///
    /// Callers that queued behind a refresh reuse its outcome: the new token
    /// on success, the same error on failure.
    pub async fn get_token(&self) -> Result<String, AuthError> {
        let observed = self.store.epoch();
        let mut slot = self.store.lock().await;

        if let Some(token) = slot.usable(self.refresh_margin) {
            return Ok(token);
        }
        if let Some(error) = slot.failure_since(observed) {
            debug!("Reusing failure of concurrent token refresh");
            return Err(error);
        }

        self.refresh_locked(&mut slot).await
    }

    /// Requests a new token unconditionally.
    ///
    /// Serialized with every other refresh. On failure the cached token is
    /// left in place.
    pub async fn refresh_token(&self) -> Result<String, AuthError> {
        let mut slot = self.store.lock().await;
        self.refresh_locked(&mut slot).await
    }

    /// Forces the next [`get_token`](Self::get_token) to refresh.
    pub async fn invalidate_token(&self) {
        self.store.invalidate().await;
        debug!("Access token invalidated");
    }

    /// Drops the cached token only if it is the one a request was sent
    /// with. A token refreshed in the meantime stays cached.
    pub async fn invalidate_token_if(&self, used: &str) {
        if self.store.invalidate_if(used).await {
            debug!("Rejected access token invalidated");
        } else {
            debug!("Rejected access token already replaced");
        }
    }

    /// Wall-clock expiry of the cached token.
    pub async fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.store.expires_at().await
    }

    async fn refresh_locked(&self, slot: &mut TokenSlot<'_>) -> Result<String, AuthError> {
        match self.request_token().await {
            Ok(token) => {
                let access_token = token.access_token.clone();
                if token.expires_in <= 0 {
                    warn!(
                        expires_in = token.expires_in,
                        "Token endpoint returned a non-positive lifetime; token will be refreshed on next use"
                    );
                }
                slot.store(token);
                info!(expires_at = ?slot.expires_at(), "Obtained access token");
                Ok(access_token)
            }
            Err(error) => {
                warn!(error = %error, "Token refresh failed");
                slot.record_failure(error.clone());
                Err(error)
            }
        }
    }

    #[instrument(skip(self), fields(instance = %self.credential.instance(), region = %self.credential.region()))]
    async fn request_token(&self) -> Result<Token, AuthError> {
        self.credential.validate()?;
        info!("Requesting new OAuth2 access token");

        let response = self
            .http
            .post(&self.token_url)
            .header(header::AUTHORIZATION, self.credential.basic_auth_header())
            .header(header::ACCEPT, "application/json")
            .form(&[("grant_type", GRANT_TYPE), ("scope", self.scope.as_str())])
            .send()
            .await
            .map_err(|e| AuthError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::RequestFailed(e.to_string()))?;

        if !status.is_success() {
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let token: Token =
            serde_json::from_str(&body).map_err(|e| AuthError::InvalidPayload(e.to_string()))?;
        if token.access_token.is_empty() {
            return Err(AuthError::InvalidPayload("access_token is empty".into()));
        }

        debug!(token_type = %token.token_type, expires_in = token.expires_in, "Token response parsed");
        Ok(token)
    }
}
