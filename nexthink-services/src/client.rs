//! Top-level API client.

use std::sync::Arc;

use nexthink_transport::{
    AuthError, ClientConfig, ResultDownloader, TokenManager, Transport, TransportError,
};
use tracing::{info, instrument};

use crate::nql::NqlService;

/// Client for the Nexthink API.
///
/// Cloning is cheap. Clones share one token cache and one connection pool.
#[derive(Debug, Clone)]
pub struct NexthinkClient {
    transport: Transport,
    nql: NqlService,
}

impl NexthinkClient {
    /// Builds a client without contacting the API.
    ///
    /// The first token is fetched on the first request.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let transport = Transport::new(config)?;
        let downloader = ResultDownloader::from_config(config)?;
        let nql = NqlService::new(transport.clone(), downloader);
        Ok(Self { transport, nql })
    }

    /// Builds a client and fetches a token, failing fast on bad credentials.
    #[instrument(skip(config), fields(instance = %config.credential.instance()))]
    pub async fn connect(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = Self::new(config)?;
        client.token_manager().get_token().await?;
        info!(base_url = %client.transport.base_url(), "Connected to Nexthink API");
        Ok(client)
    }

    /// Builds a client from `NEXTHINK_*` environment variables.
    pub fn from_env() -> Result<Self, TransportError> {
        Self::new(&ClientConfig::from_env()?)
    }

    /// NQL query execution and export.
    pub fn nql(&self) -> &NqlService {
        &self.nql
    }

    /// The shared request pipeline.
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// The shared token manager.
    pub fn token_manager(&self) -> &Arc<TokenManager> {
        self.transport.token_manager()
    }

    /// Forces a new token regardless of the cached one.
    pub async fn refresh_token(&self) -> Result<String, AuthError> {
        self.token_manager().refresh_token().await
    }

    /// Drops the cached token. The next request fetches a new one.
    pub async fn invalidate_token(&self) {
        self.token_manager().invalidate_token().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexthink_core::Region;
    use nexthink_transport::Credential;

    fn config() -> ClientConfig {
        ClientConfig::new(Credential::new("id", "secret", "acme", Region::Us))
    }

    #[test]
    fn test_new_uses_region_urls() {
        let client = NexthinkClient::new(&config()).unwrap();
        assert_eq!(client.transport().base_url(), "https://acme.api.us.nexthink.cloud");
        assert_eq!(
            client.token_manager().token_url(),
            "https://acme-login.us.nexthink.cloud/oauth2/default/v1/token"
        );
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let bad = config().with_retry_count(11);
        assert!(NexthinkClient::new(&bad).is_err());
    }

    #[test]
    fn test_clones_share_token_manager() {
        let client = NexthinkClient::new(&config()).unwrap();
        let clone = client.clone();
        assert!(Arc::ptr_eq(client.token_manager(), clone.token_manager()));
    }
}
