//! Authenticated request pipeline.
//!
//! Every attempt of a request goes through the same steps:
//!
//! 1. obtain a bearer token from the [`TokenManager`]
//! 2. attach it together with the caller and global headers
//! 3. send, read the whole body
//! 4. classify non-success statuses, validate the content type of successes
//!
//! Failed attempts are retried according to the [`RetryStrategy`]; client
//! errors never are. A 401 drops the cached token so the next call
//! re-authenticates.

use std::sync::Arc;

use nexthink_core::status_code;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::auth::TokenManager;
use crate::classify::classify_error;
use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::request::ApiRequest;
use crate::response::ApiResponse;
use crate::retry::RetryStrategy;

// ============================================================================
// Transport
// ============================================================================

/// Shared HTTP transport for the Nexthink API.
///
/// Cheap to clone. Clones share the connection pool and the token manager.
#[derive(Debug, Clone)]
pub struct Transport {
    http: Client,
    base_url: String,
    tokens: Arc<TokenManager>,
    retry: RetryStrategy,
    global_headers: HeaderMap,
    debug: bool,
}

impl Transport {
    /// Builds a transport from a validated configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        config.validate()?;

        let http = config.http_client(config.timeout)?;
        let tokens = TokenManager::new(config.credential.clone(), http.clone())
            .with_token_url(config.resolved_token_url())
            .with_scope(config.scope.clone())
            .with_refresh_margin(config.refresh_margin);

        let mut global_headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let (name, value) = parse_header(name, value).map_err(|e| match e {
                TransportError::InvalidInput(msg) => TransportError::Config(msg),
                other => other,
            })?;
            global_headers.insert(name, value);
        }

        let transport = Self {
            http,
            base_url: config.resolved_base_url(),
            tokens: Arc::new(tokens),
            retry: config.retry_strategy(),
            global_headers,
            debug: config.debug,
        };

        info!(
            instance = %config.credential.instance(),
            region = %config.credential.region(),
            base_url = %transport.base_url,
            "Nexthink API transport created"
        );
        Ok(transport)
    }

    /// API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Shared token manager.
    pub fn token_manager(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    /// Retry strategy in use.
    pub fn retry_strategy(&self) -> &RetryStrategy {
        &self.retry
    }

    /// Sends a request, retrying transient failures.
    ///
    /// Cancelling `cancel` aborts the in-flight attempt or the wait between
    /// attempts and returns [`TransportError::Cancelled`].
    #[instrument(skip(self, request, cancel), fields(method = %request.method, path = %request.path))]
    pub async fn execute(
        &self,
        request: &ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse, TransportError> {
        if !request.path.starts_with('/') {
            return Err(TransportError::InvalidInput(format!(
                "request path must start with '/': {}",
                request.path
            )));
        }
        let url = format!("{}{}", self.base_url, request.path);

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            debug!(attempt, "Sending request");

            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(TransportError::Cancelled),
                result = self.send_once(request, &url) => result,
            };

            match result {
                Ok(response) => return Ok(response),
                Err(error) if attempt <= self.retry.max_retries && self.retry.should_retry(&error) => {
                    let delay = self.retry.delay_for_attempt(attempt);
                    warn!(error = %error, attempt, delay = ?delay, "Request failed, retrying");
                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => return Err(TransportError::Cancelled),
                        () = tokio::time::sleep(delay) => {}
                    }
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// Sends a request and decodes its JSON body.
    pub async fn execute_json<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<T, TransportError> {
        self.execute(request, cancel).await?.json()
    }

    /// GET `path` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<T, TransportError> {
        self.execute_json(&ApiRequest::get(path), cancel).await
    }

    /// POST `body` as JSON to `path` and decode the JSON response.
    pub async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        cancel: &CancellationToken,
    ) -> Result<T, TransportError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = ApiRequest::post(path).with_json(body)?;
        self.execute_json(&request, cancel).await
    }

    async fn send_once(&self, request: &ApiRequest, url: &str) -> Result<ApiResponse, TransportError> {
        let token = self.tokens.get_token().await?;
        let headers = self.headers_for(request, &token)?;

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .headers(headers);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            if self.debug {
                debug!(body = %body, "Request body");
            }
            builder = builder.json(body);
        }

        let started = Instant::now();
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();
        let duration = started.elapsed();

        debug!(status, duration = ?duration, bytes = body.len(), "Response received");
        if self.debug {
            debug!(body = %String::from_utf8_lossy(&body), "Response body");
        }

        if !(200..300).contains(&status) {
            if status == status_code::UNAUTHORIZED {
                warn!("Received 401, invalidating cached token");
                self.tokens.invalidate_token_if(&token).await;
            }
            return Err(classify_error(status, request.method.as_str(), &request.path, &body).into());
        }

        check_content_type(status, &headers, &body, &request.accept)?;

        Ok(ApiResponse {
            status,
            headers,
            body,
            duration,
        })
    }

    fn headers_for(&self, request: &ApiRequest, token: &str) -> Result<HeaderMap, TransportError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            let (name, value) = parse_header(name, value)?;
            headers.insert(name, value);
        }

        if !headers.contains_key(header::ACCEPT) && !request.accept.is_empty() {
            let (name, value) = parse_header(header::ACCEPT.as_str(), &request.accept_header())?;
            headers.insert(name, value);
        }

        let bearer = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| TransportError::InvalidInput("access token is not a valid header value".into()))?;
        headers.insert(header::AUTHORIZATION, bearer);

        for (name, value) in &self.global_headers {
            headers.entry(name.clone()).or_insert_with(|| value.clone());
        }
        Ok(headers)
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), TransportError> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| TransportError::InvalidInput(format!("invalid header name: {name}")))?;
    let header_value = HeaderValue::from_str(value)
        .map_err(|_| TransportError::InvalidInput(format!("invalid value for header {name}")))?;
    Ok((header_name, header_value))
}

/// Checks the media type of a success response.
///
/// Empty bodies and responses without a `Content-Type` pass.
fn check_content_type(
    status: u16,
    headers: &HeaderMap,
    body: &[u8],
    accept: &[String],
) -> Result<(), TransportError> {
    if body.is_empty() || accept.is_empty() {
        return Ok(());
    }
    let Some(value) = headers.get(header::CONTENT_TYPE) else {
        return Ok(());
    };
    let content_type = value.to_str().unwrap_or_default().trim().to_ascii_lowercase();
    if content_type.is_empty() {
        return Ok(());
    }

    if accept
        .iter()
        .any(|expected| content_type.starts_with(&expected.to_ascii_lowercase()))
    {
        Ok(())
    } else {
        Err(TransportError::UnexpectedContentType {
            status,
            content_type,
            expected: accept.join(", "),
        })
    }
}
