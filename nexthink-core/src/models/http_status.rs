//! HTTP status table for API error responses.
//!
//! The API documents a fixed set of error statuses. [`ErrorKind`] names each
//! of them and carries the message used when a response body gives nothing
//! better.

use serde::{Deserialize, Serialize};

/// Numeric status codes returned by the API.
pub mod status_code {
    /// Successful GET.
    pub const OK: u16 = 200;
    /// Successful POST.
    pub const CREATED: u16 = 201;
    /// Bad request, invalid arguments.
    pub const BAD_REQUEST: u16 = 400;
    /// Authentication required or invalid credentials.
    pub const UNAUTHORIZED: u16 = 401;
    /// Forbidden operation.
    pub const FORBIDDEN: u16 = 403;
    /// Resource not found.
    pub const NOT_FOUND: u16 = 404;
    /// Resource already exists.
    pub const CONFLICT: u16 = 409;
    /// Validation errors.
    pub const UNPROCESSABLE_ENTITY: u16 = 422;
    /// Rate limit exceeded.
    pub const TOO_MANY_REQUESTS: u16 = 429;
    /// Server-side error.
    pub const INTERNAL_SERVER_ERROR: u16 = 500;
    /// Gateway error.
    pub const BAD_GATEWAY: u16 = 502;
    /// Service temporarily unavailable.
    pub const SERVICE_UNAVAILABLE: u16 = 503;
    /// Deadline exceeded.
    pub const GATEWAY_TIMEOUT: u16 = 504;
}

/// Classification of an error status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// 400.
    BadRequest,
    /// 401.
    Unauthorized,
    /// 403.
    Forbidden,
    /// 404.
    NotFound,
    /// 409.
    Conflict,
    /// 422.
    Validation,
    /// 429.
    RateLimited,
    /// 500.
    InternalServerError,
    /// 502.
    BadGateway,
    /// 503.
    ServiceUnavailable,
    /// 504.
    GatewayTimeout,
    /// Any other status.
    Other,
}

impl ErrorKind {
    /// Maps a status code to its kind.
    pub fn from_status(status: u16) -> Self {
        match status {
            status_code::BAD_REQUEST => Self::BadRequest,
            status_code::UNAUTHORIZED => Self::Unauthorized,
            status_code::FORBIDDEN => Self::Forbidden,
            status_code::NOT_FOUND => Self::NotFound,
            status_code::CONFLICT => Self::Conflict,
            status_code::UNPROCESSABLE_ENTITY => Self::Validation,
            status_code::TOO_MANY_REQUESTS => Self::RateLimited,
            status_code::INTERNAL_SERVER_ERROR => Self::InternalServerError,
            status_code::BAD_GATEWAY => Self::BadGateway,
            status_code::SERVICE_UNAVAILABLE => Self::ServiceUnavailable,
            status_code::GATEWAY_TIMEOUT => Self::GatewayTimeout,
            _ => Self::Other,
        }
    }

    /// Message used when the response body carries no usable error text.
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::BadRequest => "The API request is invalid or malformed",
            Self::Unauthorized => "Authentication required or invalid credentials",
            Self::Forbidden => "You are not allowed to perform the requested operation",
            Self::NotFound => "The requested resource was not found",
            Self::Conflict => "The resource already exists",
            Self::Validation => "Validation error",
            Self::RateLimited => "Rate limit exceeded. Too many requests in a given time period",
            Self::InternalServerError => "Internal server error",
            Self::BadGateway => "Bad gateway",
            Self::ServiceUnavailable => "Service temporarily unavailable. Retry might work",
            Self::GatewayTimeout => "The operation took too long to complete",
            Self::Other => "Unknown error",
        }
    }

    /// Returns true for 503 and 504, the statuses worth retrying later.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ServiceUnavailable | Self::GatewayTimeout)
    }
}
