//! Client configuration.
//!
//! [`ClientConfig`] collects everything needed to build a
//! [`Transport`](crate::Transport): the credential, endpoint overrides,
//! timeouts, retry policy, TLS and proxy settings, and headers sent with
//! every request. It is immutable once a transport has been built from it.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use nexthink_core::Region;
use tracing::debug;

use crate::auth::{Credential, DEFAULT_REFRESH_MARGIN, DEFAULT_SCOPE};
use crate::error::TransportError;
use crate::retry::{
    DEFAULT_RETRY_COUNT, DEFAULT_RETRY_MAX_WAIT, DEFAULT_RETRY_WAIT, MAX_RETRY_COUNT,
    RetryStrategy,
};

// ============================================================================
// Constants
// ============================================================================

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Largest accepted request timeout.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(3600);

/// Default timeout for result file downloads.
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// User agent sent unless overridden.
pub const DEFAULT_USER_AGENT: &str = concat!("nexthink-rs/", env!("CARGO_PKG_VERSION"));

/// Environment variable holding the client id.
pub const ENV_CLIENT_ID: &str = "NEXTHINK_CLIENT_ID";
/// Environment variable holding the client secret.
pub const ENV_CLIENT_SECRET: &str = "NEXTHINK_CLIENT_SECRET";
/// Environment variable holding the instance name.
pub const ENV_INSTANCE: &str = "NEXTHINK_INSTANCE";
/// Environment variable holding the region.
pub const ENV_REGION: &str = "NEXTHINK_REGION";
/// Optional environment variable overriding the API base URL.
pub const ENV_BASE_URL: &str = "NEXTHINK_BASE_URL";

// ============================================================================
// TLS
// ============================================================================

/// Minimum TLS protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsVersion {
    /// TLS 1.2.
    #[default]
    Tls12,
    /// TLS 1.3.
    Tls13,
}

impl TlsVersion {
    pub(crate) fn to_reqwest(self) -> reqwest::tls::Version {
        match self {
            Self::Tls12 => reqwest::tls::Version::TLS_1_2,
            Self::Tls13 => reqwest::tls::Version::TLS_1_3,
        }
    }
}

/// TLS settings.
#[derive(Debug, Clone, Default)]
pub struct TlsConfig {
    /// Minimum protocol version.
    pub min_version: TlsVersion,
    /// Skip certificate verification. Testing only.
    pub accept_invalid_certs: bool,
    /// Extra PEM root certificates to trust.
    pub root_certificates: Vec<PathBuf>,
}

// ============================================================================
// Client Config
// ============================================================================

/// Configuration for a Nexthink API client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// OAuth2 client credentials.
    pub credential: Credential,
    /// API base URL override.
    pub base_url: Option<String>,
    /// Token endpoint override.
    pub token_url: Option<String>,
    /// OAuth2 scope.
    pub scope: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retries after the first attempt.
    pub retry_count: u32,
    /// Base wait between attempts.
    pub retry_wait: Duration,
    /// Cap on the wait between attempts.
    pub retry_max_wait: Duration,
    /// Grow waits exponentially instead of linearly.
    pub exponential_backoff: bool,
    /// Refresh tokens this long before they expire.
    pub refresh_margin: Duration,
    /// TLS settings.
    pub tls: TlsConfig,
    /// Explicit proxy. When unset the system proxy variables apply.
    pub proxy_url: Option<String>,
    /// Headers added to every request unless the caller sets them.
    pub headers: BTreeMap<String, String>,
    /// User agent.
    pub user_agent: String,
    /// Log request and response bodies at debug level.
    pub debug: bool,
    /// Timeout for result file downloads.
    pub download_timeout: Duration,
}

impl ClientConfig {
    /// Creates a configuration with default settings.
    pub fn new(credential: Credential) -> Self {
        Self {
            credential,
            base_url: None,
            token_url: None,
            scope: DEFAULT_SCOPE.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry_count: DEFAULT_RETRY_COUNT,
            retry_wait: DEFAULT_RETRY_WAIT,
            retry_max_wait: DEFAULT_RETRY_MAX_WAIT,
            exponential_backoff: false,
            refresh_margin: DEFAULT_REFRESH_MARGIN,
            tls: TlsConfig::default(),
            proxy_url: None,
            headers: BTreeMap::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            debug: false,
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
        }
    }

    /// Builds a configuration from `NEXTHINK_*` environment variables.
    pub fn from_env() -> Result<Self, TransportError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, TransportError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| TransportError::Config(format!("{key} environment variable is required")))
        };

        let client_id = required(ENV_CLIENT_ID)?;
        let client_secret = required(ENV_CLIENT_SECRET)?;
        let instance = required(ENV_INSTANCE)?;
        let region: Region = required(ENV_REGION)?
            .parse()
            .map_err(|e: nexthink_core::CoreError| TransportError::Config(e.to_string()))?;

        let mut config = Self::new(Credential::new(client_id, client_secret, instance, region));
        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|v| !v.is_empty()) {
            debug!(base_url = %base_url, "Using base URL from environment");
            config.base_url = Some(base_url);
        }
        Ok(config)
    }

    // ------------------------------------------------------------------------
    // Builder methods
    // ------------------------------------------------------------------------

    /// Overrides the API base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Overrides the token endpoint.
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = Some(url.into());
        self
    }

    /// Sets the OAuth2 scope.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the number of retries after the first attempt.
    pub fn with_retry_count(mut self, count: u32) -> Self {
        self.retry_count = count;
        self
    }

    /// Sets the base and maximum wait between attempts.
    pub fn with_retry_wait(mut self, wait: Duration, max_wait: Duration) -> Self {
        self.retry_wait = wait;
        self.retry_max_wait = max_wait;
        self
    }

    /// Enables or disables exponential backoff.
    pub fn with_exponential_backoff(mut self, enabled: bool) -> Self {
        self.exponential_backoff = enabled;
        self
    }

    /// Sets the token refresh margin.
    pub fn with_refresh_margin(mut self, margin: Duration) -> Self {
        self.refresh_margin = margin;
        self
    }

    /// Sets TLS options.
    pub fn with_tls(mut self, tls: TlsConfig) -> Self {
        self.tls = tls;
        self
    }

    /// Routes requests through a proxy.
    pub fn with_proxy(mut self, url: impl Into<String>) -> Self {
        self.proxy_url = Some(url.into());
        self
    }

    /// Adds a header sent with every request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Enables body logging.
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Sets the download timeout.
    pub fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }

    // ------------------------------------------------------------------------
    // Resolution
    // ------------------------------------------------------------------------

    /// Effective API base URL.
    pub fn resolved_base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| self.credential.api_base_url())
    }

    /// Effective token endpoint.
    pub fn resolved_token_url(&self) -> String {
        self.token_url
            .clone()
            .unwrap_or_else(|| self.credential.token_url())
    }

    /// Retry strategy derived from the retry settings.
    pub fn retry_strategy(&self) -> RetryStrategy {
        RetryStrategy::new(self.retry_count)
            .with_wait(self.retry_wait, self.retry_max_wait)
            .with_exponential_backoff(self.exponential_backoff)
    }

    /// Builds an HTTP client honouring the TLS, proxy and user agent settings.
    pub(crate) fn http_client(&self, timeout: Duration) -> Result<reqwest::Client, TransportError> {
        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(self.user_agent.as_str())
            .min_tls_version(self.tls.min_version.to_reqwest())
            .danger_accept_invalid_certs(self.tls.accept_invalid_certs);

        for path in &self.tls.root_certificates {
            let pem = std::fs::read(path).map_err(|e| {
                TransportError::Config(format!("failed to read root certificate {}: {e}", path.display()))
            })?;
            let certificate = reqwest::Certificate::from_pem(&pem)
                .map_err(|e| TransportError::Config(format!("invalid root certificate: {e}")))?;
            builder = builder.add_root_certificate(certificate);
        }

        if let Some(proxy) = self.proxy_url.as_deref().filter(|p| !p.is_empty()) {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| TransportError::Config(format!("invalid proxy URL: {e}")))?;
            builder = builder.proxy(proxy);
        }

        builder
            .build()
            .map_err(|e| TransportError::Config(format!("failed to build HTTP client: {e}")))
    }

    /// Checks every option against its accepted range.
    pub fn validate(&self) -> Result<(), TransportError> {
        self.credential
            .validate()
            .map_err(|e| TransportError::Config(e.to_string()))?;

        if let Some(base_url) = &self.base_url {
            validate_base_url(base_url)?;
        }
        if let Some(token_url) = &self.token_url {
            validate_http_url("token URL", token_url)?;
        }
        if self.timeout.is_zero() {
            return Err(TransportError::Config("timeout must be greater than 0".into()));
        }
        if self.timeout > MAX_TIMEOUT {
            return Err(TransportError::Config(format!(
                "timeout too large (max {} seconds)",
                MAX_TIMEOUT.as_secs()
            )));
        }
        if self.retry_count > MAX_RETRY_COUNT {
            return Err(TransportError::Config(format!(
                "retry count too large (max {MAX_RETRY_COUNT})"
            )));
        }
        if let Some(proxy) = &self.proxy_url {
            validate_proxy_url(proxy)?;
        }
        if self.download_timeout.is_zero() {
            return Err(TransportError::Config(
                "download timeout must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Validators
// ============================================================================

fn validate_http_url(what: &str, value: &str) -> Result<(), TransportError> {
    if value.is_empty() {
        return Err(TransportError::Config(format!("{what} cannot be empty")));
    }
    if !value.starts_with("https://") && !value.starts_with("http://") {
        return Err(TransportError::Config(format!(
            "{what} must start with http:// or https://"
        )));
    }
    url::Url::parse(value).map_err(|e| TransportError::Config(format!("invalid {what}: {e}")))?;
    Ok(())
}

fn validate_base_url(value: &str) -> Result<(), TransportError> {
    validate_http_url("base URL", value)?;
    if value.ends_with('/') {
        return Err(TransportError::Config(
            "base URL should not end with a trailing slash".into(),
        ));
    }
    Ok(())
}

fn validate_proxy_url(value: &str) -> Result<(), TransportError> {
    if value.is_empty() {
        return Ok(());
    }
    if !["http://", "https://", "socks5://"]
        .iter()
        .any(|scheme| value.starts_with(scheme))
    {
        return Err(TransportError::Config(
            "proxy URL must start with http://, https://, or socks5://".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ClientConfig {
        ClientConfig::new(Credential::new("id", "secret", "acme", Region::Eu))
    }

    #[test]
    fn test_defaults() {
        let config = config();
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.retry_count, 3);
        assert_eq!(config.scope, "service:integration");
        assert!(config.user_agent.starts_with("nexthink-rs/"));
        assert_eq!(config.resolved_base_url(), "https://acme.api.eu.nexthink.cloud");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = config()
            .with_base_url("http://localhost:8080")
            .with_token_url("http://localhost:8080/token");
        assert_eq!(config.resolved_base_url(), "http://localhost:8080");
        assert_eq!(config.resolved_token_url(), "http://localhost:8080/token");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_bounds() {
        assert!(config().with_timeout(Duration::ZERO).validate().is_err());
        assert!(config().with_timeout(Duration::from_secs(3601)).validate().is_err());
        assert!(config().with_timeout(Duration::from_secs(3600)).validate().is_ok());
        assert!(config().with_retry_count(11).validate().is_err());
        assert!(config().with_retry_count(10).validate().is_ok());
        assert!(config().with_base_url("https://x.test/").validate().is_err());
        assert!(config().with_base_url("ftp://x.test").validate().is_err());
        assert!(config().with_proxy("socks5://127.0.0.1:1080").validate().is_ok());
        assert!(config().with_proxy("ftp://proxy").validate().is_err());
    }

    #[test]
    fn test_from_lookup() {
        let vars = BTreeMap::from([
            (ENV_CLIENT_ID, "id"),
            (ENV_CLIENT_SECRET, "secret"),
            (ENV_INSTANCE, "acme"),
            (ENV_REGION, "meta"),
            (ENV_BASE_URL, "http://127.0.0.1:1234"),
        ]);
        let config =
            ClientConfig::from_lookup(|k| vars.get(k).map(|v| (*v).to_string())).unwrap();
        assert_eq!(config.credential.region(), Region::Meta);
        assert_eq!(config.resolved_base_url(), "http://127.0.0.1:1234");
    }

    #[test]
    fn test_from_lookup_missing_or_invalid() {
        let err = ClientConfig::from_lookup(|_| None).unwrap_err();
        assert!(err.to_string().contains(ENV_CLIENT_ID));

        let err = ClientConfig::from_lookup(|k| {
            Some(if k == ENV_REGION { "mars" } else { "x" }.to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("invalid region"));
    }
}
