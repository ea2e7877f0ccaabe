use reqwest::StatusCode;
use std::fmt;

/// Errors that can occur during external service communication
#[derive(Debug)]
pub enum ConnectorError {
    /// HTTP request/response error
    HttpError(String),
    /// Service unreachable or timeout
    ServiceUnavailable(String),
    /// Invalid response format from external service
    InvalidResponse(String),
    /// Authentication error (401/403)
    Unauthorized(String),
    /// Not found (404)
    NotFound(String),
    /// Rate limited or exceeded quota
    RateLimited(String),
    /// Internal error in connector
    Internal(String),
}

impl ConnectorError {
    /// Maps a non-success HTTP status of an upstream call.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized(body),
            StatusCode::NOT_FOUND => Self::NotFound(body),
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited(body),
            s if s.is_server_error() => Self::ServiceUnavailable(format!("{s}: {body}")),
            s => Self::HttpError(format!("{s}: {body}")),
        }
    }
}

impl fmt::Display for ConnectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            Self::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            Self::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            Self::NotFound(msg) => write!(f, "Not found: {}", msg),
            Self::RateLimited(msg) => write!(f, "Rate limited: {}", msg),
            Self::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ConnectorError {}

impl From<reqwest::Error> for ConnectorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::ServiceUnavailable(format!("Request timeout: {}", err))
        } else if err.is_connect() {
            Self::ServiceUnavailable(format!("Connection failed: {}", err))
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::HttpError(err.to_string())
        }
    }
}
