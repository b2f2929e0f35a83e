//! Request description handed to the transport.

use reqwest::Method;
use serde::Serialize;

use crate::error::TransportError;

/// Media type accepted when a request does not say otherwise.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// A request relative to the API base URL.
///
/// Built once and replayed unchanged on every retry attempt.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Path starting with `/`.
    pub path: String,
    /// Query parameters.
    pub query: Vec<(String, String)>,
    /// JSON body.
    pub body: Option<serde_json::Value>,
    /// Caller headers. These win over the configured global headers.
    pub headers: Vec<(String, String)>,
    /// Media types a success response may carry.
    pub accept: Vec<String>,
}

impl ApiRequest {
    /// Creates a request.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: Vec::new(),
            accept: vec![CONTENT_TYPE_JSON.to_string()],
        }
    }

    /// GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Adds a query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Sets a JSON body.
    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, TransportError> {
        let value = serde_json::to_value(body)
            .map_err(|e| TransportError::InvalidInput(format!("failed to encode request body: {e}")))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Adds a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Replaces the accepted response media types.
    pub fn with_accept<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accept = types.into_iter().map(Into::into).collect();
        self
    }

    /// Value for the `Accept` header.
    pub fn accept_header(&self) -> String {
        self.accept.join(", ")
    }

    /// Returns true if a caller header with this name was set.
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let request = ApiRequest::post("/api/v1/nql/execute")
            .with_query("a", "1")
            .with_header("X-Custom", "v")
            .with_accept(["application/json", "text/csv"])
            .with_json(&serde_json::json!({"queryId": "#q"}))
            .unwrap();

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.query, vec![("a".to_string(), "1".to_string())]);
        assert!(request.has_header("x-custom"));
        assert!(!request.has_header("Accept"));
        assert_eq!(request.accept_header(), "application/json, text/csv");
        assert_eq!(request.body.unwrap()["queryId"], "#q");
    }

    #[test]
    fn test_default_accept() {
        assert_eq!(ApiRequest::get("/x").accept_header(), "application/json");
    }
}
