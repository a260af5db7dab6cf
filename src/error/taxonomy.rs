//! Transport and provider error taxonomy

use serde::{Deserialize, Serialize};

/// Stable machine-readable error codes, shared unmodified across adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NetworkError,
    Timeout,
    RateLimit,
    ServerError,
    AuthError,
    ClientError,
    ParseError,
    InvalidRequest,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkError => "NETWORK_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::RateLimit => "RATE_LIMIT",
            Self::ServerError => "SERVER_ERROR",
            Self::AuthError => "AUTH_ERROR",
            Self::ClientError => "CLIENT_ERROR",
            Self::ParseError => "PARSE_ERROR",
            Self::InvalidRequest => "INVALID_REQUEST",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified pipeline error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AiError {
    /// Connection-level failure reaching a provider.
    #[error("Network error: {message}")]
    Network { message: String },

    /// The per-call timeout elapsed before a response arrived.
    #[error("Request timed out: {message}")]
    Timeout { message: String },

    /// Provider or local limiter rejected the request for quota reasons.
    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        message: String,
        /// Minimum delay hint in milliseconds, from the limiter's window
        /// reset time or a provider Retry-After header.
        retry_after_ms: Option<u64>,
    },

    /// Provider returned a 5xx status.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Authentication rejected (401/403).
    #[error("Authentication error: {message}")]
    Auth { message: String },

    /// Other 4xx status.
    #[error("Client error ({status}): {message}")]
    Client { status: u16, message: String },

    /// Response body was malformed or empty.
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// The request failed pre-dispatch schema validation.
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },
}

impl AiError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    pub fn rate_limit(message: impl Into<String>, retry_after_ms: Option<u64>) -> Self {
        Self::RateLimit {
            message: message.into(),
            retry_after_ms,
        }
    }

    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    pub fn client(status: u16, message: impl Into<String>) -> Self {
        Self::Client {
            status,
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Maps an HTTP status plus body into the taxonomy.
    ///
    /// `>= 500` and 429 are retryable, auth and other 4xx are not.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 | 403 => Self::auth(format!("status {status}: {body}")),
            429 => Self::rate_limit(format!("status 429: {body}"), None),
            400..=499 => Self::client(status, body.to_string()),
            500..=599 => Self::server(status, body.to_string()),
            other => Self::server(other, body.to_string()),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Network { .. } => ErrorCode::NetworkError,
            Self::Timeout { .. } => ErrorCode::Timeout,
            Self::RateLimit { .. } => ErrorCode::RateLimit,
            Self::Server { .. } => ErrorCode::ServerError,
            Self::Auth { .. } => ErrorCode::AuthError,
            Self::Client { .. } => ErrorCode::ClientError,
            Self::Parse { .. } => ErrorCode::ParseError,
            Self::InvalidRequest { .. } => ErrorCode::InvalidRequest,
        }
    }

    /// Whether the queue may re-attempt this failure under backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network { .. }
                | Self::Timeout { .. }
                | Self::RateLimit { .. }
                | Self::Server { .. }
        )
    }

    /// Minimum-delay hint in milliseconds, when the failure carries one.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            Self::RateLimit { retry_after_ms, .. } => *retry_after_ms,
            _ => None,
        }
    }
}
