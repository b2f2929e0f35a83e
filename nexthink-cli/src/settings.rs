//! Connection profile: an optional JSON file overlaid with environment variables.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use nexthink_core::Region;
use nexthink_transport::config::{
    ENV_BASE_URL, ENV_CLIENT_ID, ENV_CLIENT_SECRET, ENV_INSTANCE, ENV_REGION,
};
use nexthink_transport::{ClientConfig, Credential};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Connection settings read from `config.json`.
///
/// Every field is optional; environment variables fill or override them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub instance: Option<String>,
    pub region: Option<Region>,
    pub base_url: Option<String>,
    pub token_url: Option<String>,
    pub scope: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,
    pub retry_count: Option<u32>,
    pub proxy_url: Option<String>,
    /// Extra headers sent with every request.
    pub headers: BTreeMap<String, String>,
}

impl Profile {
    /// `<config dir>/nexthink/config.json`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nexthink")
            .join("config.json")
    }

    /// Loads a profile. A missing file yields an empty profile.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "Profile not found, using environment only");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let profile: Profile = serde_json::from_str(&content)
            .with_context(|| format!("invalid profile {}", path.display()))?;

        info!(path = %path.display(), "Loaded profile");
        Ok(profile)
    }

    /// Overrides fields with non-empty `NEXTHINK_*` variables.
    pub fn overlay_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = get(ENV_CLIENT_ID) {
            self.client_id = Some(v);
        }
        if let Some(v) = get(ENV_CLIENT_SECRET) {
            self.client_secret = Some(v);
        }
        if let Some(v) = get(ENV_INSTANCE) {
            self.instance = Some(v);
        }
        if let Some(v) = get(ENV_REGION) {
            self.region = Some(v.parse::<Region>().with_context(|| format!("{ENV_REGION} is invalid"))?);
        }
        if let Some(v) = get(ENV_BASE_URL) {
            self.base_url = Some(v);
        }
        Ok(self)
    }

    /// Builds a client configuration. Credentials and region are required.
    pub fn into_config(self) -> Result<ClientConfig> {
        let client_id = self
            .client_id
            .with_context(|| format!("client id missing: set {ENV_CLIENT_ID} or client_id"))?;
        let client_secret = self.client_secret.with_context(|| {
            format!("client secret missing: set {ENV_CLIENT_SECRET} or client_secret")
        })?;
        let instance = self
            .instance
            .with_context(|| format!("instance missing: set {ENV_INSTANCE} or instance"))?;
        let region = self
            .region
            .with_context(|| format!("region missing: set {ENV_REGION} or region"))?;

        let mut config =
            ClientConfig::new(Credential::new(client_id, client_secret, instance, region));
        if let Some(url) = self.base_url {
            config = config.with_base_url(url);
        }
        if let Some(url) = self.token_url {
            config = config.with_token_url(url);
        }
        if let Some(scope) = self.scope {
            config = config.with_scope(scope);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(count) = self.retry_count {
            config = config.with_retry_count(count);
        }
        if let Some(proxy) = self.proxy_url {
            config = config.with_proxy(proxy);
        }
        for (name, value) in self.headers {
            config = config.with_header(name, value);
        }
        Ok(config)
    }
}
