//! Download of export result files.
//!
//! Result files are served from pre-signed URLs. They must be fetched
//! without the API bearer token, so the downloader owns a separate client
//! with no default headers and a longer timeout.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::config::{ClientConfig, DEFAULT_USER_AGENT};
use crate::error::{DownloadError, TransportError};

/// Unauthenticated client for result files.
#[derive(Debug, Clone)]
pub struct ResultDownloader {
    http: Client,
}

impl ResultDownloader {
    /// Creates a downloader with the given timeout.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()
            .map_err(|e| TransportError::Config(format!("failed to build download client: {e}")))?;
        Ok(Self { http })
    }

    /// Creates a downloader sharing the TLS and proxy settings of `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        Ok(Self {
            http: config.http_client(config.download_timeout)?,
        })
    }

    /// Fetches `url` and returns the body.
    #[instrument(skip_all)]
    pub async fn download(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, DownloadError> {
        if url.is_empty() {
            return Err(DownloadError::EmptyUrl);
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(DownloadError::Cancelled),
            result = self.fetch(url) => result,
        }
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        debug!("Downloading result file");
        let response = self.http.get(url).send().await?;
        let status = response.status();

        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(DownloadError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?.to_vec();
        info!(bytes = bytes.len(), "Result file downloaded");
        Ok(bytes)
    }
}
