//! Transport error types.

use std::fmt;
use std::time::Duration;

use nexthink_core::{ErrorKind, status_code};
use thiserror::Error;

// ============================================================================
// Auth Error
// ============================================================================

/// Error obtaining an access token.
///
/// `Clone` so that one failed refresh can be handed to every caller that
/// queued behind it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Credential fields are missing or malformed.
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    /// The token endpoint could not be reached.
    #[error("token request failed: {0}")]
    RequestFailed(String),

    /// The token endpoint answered with a non-success status.
    #[error("token request rejected with status {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// The token endpoint answered with a payload that is not a token.
    #[error("invalid token response: {0}")]
    InvalidPayload(String),
}

// ============================================================================
// API Error
// ============================================================================

/// A classified non-success response from the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Canonical status text, e.g. `Not Found`.
    pub status_text: String,
    /// HTTP method of the failed request.
    pub method: String,
    /// Request path of the failed request.
    pub endpoint: String,
    /// Machine-readable error code, when the body carried one.
    pub code: Option<String>,
    /// Human-readable message.
    pub message: String,
    /// Additional details from the body.
    pub details: Option<String>,
}

impl ApiError {
    /// Returns the status classification.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::from_status(self.status)
    }

    /// 400.
    pub fn is_bad_request(&self) -> bool {
        self.status == status_code::BAD_REQUEST
    }

    /// 401.
    pub fn is_unauthorized(&self) -> bool {
        self.status == status_code::UNAUTHORIZED
    }

    /// 403.
    pub fn is_forbidden(&self) -> bool {
        self.status == status_code::FORBIDDEN
    }

    /// 404.
    pub fn is_not_found(&self) -> bool {
        self.status == status_code::NOT_FOUND
    }

    /// 409.
    pub fn is_conflict(&self) -> bool {
        self.status == status_code::CONFLICT
    }

    /// 422.
    pub fn is_validation_error(&self) -> bool {
        self.status == status_code::UNPROCESSABLE_ENTITY
    }

    /// 429.
    pub fn is_rate_limited(&self) -> bool {
        self.status == status_code::TOO_MANY_REQUESTS
    }

    /// Any 5xx.
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    /// 503 or 504 only.
    pub fn is_transient(&self) -> bool {
        self.kind().is_transient()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nexthink API error ({} {})", self.status, self.status_text)?;
        if let Some(code) = &self.code {
            write!(f, " [{code}]")?;
        }
        write!(f, " at {} {}: {}", self.method, self.endpoint, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// Transport Error
// ============================================================================

/// Error type for requests issued through the transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Caller-side validation failed. No request was sent.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Client configuration is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// No token could be obtained.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// The request produced no response.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with an error status.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A success response carried a body of the wrong media type.
    #[error("unexpected content type '{content_type}' (status {status}, expected {expected})")]
    UnexpectedContentType {
        /// HTTP status code of the response.
        status: u16,
        /// Content-Type header received.
        content_type: String,
        /// Accepted media types, comma separated.
        expected: String,
    },

    /// A success response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The operation was cancelled by the caller.
    #[error("request cancelled")]
    Cancelled,
}

impl TransportError {
    /// Returns the classified API error, if this is one.
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }

    /// HTTP status of the response that caused this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api(e) => Some(e.status),
            Self::UnexpectedContentType { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Machine-readable error code from the API body, if any.
    pub fn error_code(&self) -> Option<&str> {
        self.api().and_then(|e| e.code.as_deref())
    }

    /// Returns true if the error came from caller-side validation.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Returns true if the operation was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// 400.
    pub fn is_bad_request(&self) -> bool {
        self.api().is_some_and(ApiError::is_bad_request)
    }

    /// 401.
    pub fn is_unauthorized(&self) -> bool {
        self.api().is_some_and(ApiError::is_unauthorized)
    }

    /// 403.
    pub fn is_forbidden(&self) -> bool {
        self.api().is_some_and(ApiError::is_forbidden)
    }

    /// 404.
    pub fn is_not_found(&self) -> bool {
        self.api().is_some_and(ApiError::is_not_found)
    }

    /// 409.
    pub fn is_conflict(&self) -> bool {
        self.api().is_some_and(ApiError::is_conflict)
    }

    /// 422.
    pub fn is_validation_error(&self) -> bool {
        self.api().is_some_and(ApiError::is_validation_error)
    }

    /// 429.
    pub fn is_rate_limited(&self) -> bool {
        self.api().is_some_and(ApiError::is_rate_limited)
    }

    /// Any 5xx.
    pub fn is_server_error(&self) -> bool {
        self.api().is_some_and(ApiError::is_server_error)
    }

    /// 503 or 504 only.
    pub fn is_transient(&self) -> bool {
        self.api().is_some_and(ApiError::is_transient)
    }
}

// ============================================================================
// Poll Error
// ============================================================================

/// Error returned while waiting for a job to reach a terminal state.
#[derive(Debug, Error)]
pub enum PollError<S: fmt::Debug> {
    /// The job id was empty.
    #[error("job id cannot be empty")]
    InvalidJobId,

    /// The deadline passed before the job finished.
    #[error("timed out after {waited:?} waiting for job (last status: {last:?})")]
    Timeout {
        /// Last observed status, if any check completed.
        last: Option<S>,
        /// Time spent waiting.
        waited: Duration,
    },

    /// A status check failed.
    #[error("status check failed: {0}")]
    Transport(#[from] TransportError),

    /// The wait was cancelled by the caller.
    #[error("wait cancelled")]
    Cancelled,
}

impl<S: fmt::Debug> PollError<S> {
    /// Returns true if the deadline passed.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

// ============================================================================
// Download Error
// ============================================================================

/// Error downloading an export result file.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The download URL was empty.
    #[error("download URL cannot be empty")]
    EmptyUrl,

    /// The request produced no response.
    #[error("download failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The file server answered with a non-200 status.
    #[error("download failed with status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// The download was cancelled by the caller.
    #[error("download cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(status: u16, code: Option<&str>) -> ApiError {
        ApiError {
            status,
            status_text: "Bad Request".to_string(),
            method: "POST".to_string(),
            endpoint: "/api/v1/nql/execute".to_string(),
            code: code.map(str::to_string),
            message: "m".to_string(),
            details: None,
        }
    }

    #[test]
    fn test_api_error_display() {
        assert_eq!(
            api_error(400, Some("INVALID_QUERY")).to_string(),
            "Nexthink API error (400 Bad Request) [INVALID_QUERY] at POST /api/v1/nql/execute: m"
        );
        assert_eq!(
            api_error(400, None).to_string(),
            "Nexthink API error (400 Bad Request) at POST /api/v1/nql/execute: m"
        );
    }

    #[test]
    fn test_predicates() {
        let err = TransportError::from(api_error(503, None));
        assert!(err.is_server_error());
        assert!(err.is_transient());
        assert!(!err.is_bad_request());
        assert_eq!(err.status(), Some(503));

        let err = TransportError::from(api_error(500, None));
        assert!(err.is_server_error());
        assert!(!err.is_transient());

        let err = TransportError::from(api_error(422, Some("E1")));
        assert!(err.is_validation_error());
        assert_eq!(err.error_code(), Some("E1"));

        let err = TransportError::InvalidInput("query id is required".to_string());
        assert!(err.is_invalid_input());
        assert!(!err.is_not_found());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_poll_error_timeout() {
        let err: PollError<&str> = PollError::Timeout {
            last: Some("SUBMITTED"),
            waited: Duration::from_secs(1),
        };
        assert!(err.is_timeout());
        assert!(!PollError::<&str>::Cancelled.is_timeout());
    }
}
