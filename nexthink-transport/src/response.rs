//! Successful API responses.

use std::time::Duration;

use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

use crate::error::TransportError;

/// Rate limit headers of a response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimit {
    /// `X-Rate-Limit`.
    pub limit: Option<String>,
    /// `X-Rate-Limit-Remaining`.
    pub remaining: Option<String>,
    /// `X-Rate-Limit-Reset`.
    pub reset: Option<String>,
    /// `Retry-After`.
    pub retry_after: Option<String>,
}

/// A fully read response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// Raw body.
    pub body: Vec<u8>,
    /// Time from send to body fully read, for the final attempt.
    pub duration: Duration,
}

impl ApiResponse {
    /// Returns true for 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Header value as text. Names are case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// `Content-Type` header.
    pub fn content_type(&self) -> Option<&str> {
        self.header(reqwest::header::CONTENT_TYPE.as_str())
    }

    /// Rate limit headers.
    pub fn rate_limit(&self) -> RateLimit {
        let owned = |name: &str| self.header(name).map(str::to_string);
        RateLimit {
            limit: owned("x-rate-limit"),
            remaining: owned("x-rate-limit-remaining"),
            reset: owned("x-rate-limit-reset"),
            retry_after: owned("retry-after"),
        }
    }

    /// Decodes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Body as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn response(body: &str) -> ApiResponse {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        headers.insert("X-Rate-Limit-Remaining", HeaderValue::from_static("42"));
        ApiResponse {
            status: 200,
            headers,
            body: body.as_bytes().to_vec(),
            duration: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_helpers() {
        let resp = response(r#"{"a":1}"#);
        assert!(resp.is_success());
        assert_eq!(resp.content_type(), Some("application/json"));
        assert_eq!(resp.header("x-rate-limit-remaining"), Some("42"));
        assert_eq!(resp.rate_limit().remaining.as_deref(), Some("42"));
        assert_eq!(resp.rate_limit().limit, None);

        let value: serde_json::Value = resp.json().unwrap();
        assert_eq!(value["a"], 1);
        assert_eq!(resp.text(), r#"{"a":1}"#);
    }

    #[test]
    fn test_json_decode_error() {
        let err = response("not json").json::<serde_json::Value>().unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
    }
}
