//! Free-text failure classification
//!
//! Adapters raise typed [`AiError`](super::AiError) values directly; the
//! substring classifiers here exist only for errors crossing opaque
//! boundaries (task store, content extractor, context builder) where all we
//! have is a message string.

use super::taxonomy::AiError;
use serde::{Deserialize, Serialize};

/// Maps a raw failure message into the transport taxonomy.
///
/// Compatibility shim for legacy free-text messages; typed errors from
/// adapters never pass through here.
pub fn classify_failure(message: &str) -> AiError {
    let lower = message.to_lowercase();

    if lower.contains("rate limit") || lower.contains("429") {
        AiError::rate_limit(message, None)
    } else if lower.contains("401") || lower.contains("unauthorized") || lower.contains("api key") {
        AiError::auth(message)
    } else if lower.contains("timeout") || lower.contains("timed out") {
        AiError::timeout(message)
    } else if lower.contains("network") || lower.contains("connection") || lower.contains("dns") {
        AiError::network(message)
    } else if lower.contains("parse") || lower.contains("malformed") || lower.contains("empty response") {
        AiError::parse(message)
    } else if lower.contains("500")
        || lower.contains("502")
        || lower.contains("503")
        || lower.contains("server error")
    {
        AiError::server(500, message)
    } else {
        AiError::invalid_request(message)
    }
}

/// Orchestration failure buckets, each with its own user-facing remedy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureCategory {
    Prompt,
    Mcp,
    Extraction,
    Network,
    System,
}

impl FailureCategory {
    /// Bucket a raw orchestration failure by substring inspection.
    pub fn from_message(message: &str) -> Self {
        let lower = message.to_lowercase();

        if lower.contains("template") || lower.contains("variable") {
            Self::Prompt
        } else if message.contains("MCP") {
            Self::Mcp
        } else if lower.contains("extract") || lower.contains("dom") {
            Self::Extraction
        } else if lower.contains("network") || lower.contains("timeout") || lower.contains("timed out")
        {
            Self::Network
        } else {
            Self::System
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prompt => "prompt",
            Self::Mcp => "mcp",
            Self::Extraction => "extraction",
            Self::Network => "network",
            Self::System => "system",
        }
    }

    /// One-line user-facing description of what went wrong.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Prompt => "The task's prompt template could not be applied to this page.",
            Self::Mcp => "The auxiliary context service did not respond.",
            Self::Extraction => "Page content could not be extracted.",
            Self::Network => "The AI provider could not be reached.",
            Self::System => "An unexpected error interrupted the task.",
        }
    }

    /// Suggested remedy shown alongside the technical details.
    pub fn suggested_fix(&self) -> &'static str {
        match self {
            Self::Prompt => "Review the template's placeholders against the page's available fields.",
            Self::Mcp => "Check the auxiliary context configuration, or disable it for this task.",
            Self::Extraction => "Reload the page and retry; some pages block content extraction.",
            Self::Network => "Check connectivity and provider status, then retry.",
            Self::System => "Retry the task; report the technical details if it keeps failing.",
        }
    }
}

impl std::fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_classify_rate_limit() {
        let err = classify_failure("provider said: rate limit exceeded");
        assert_eq!(err.code(), ErrorCode::RateLimit);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_classify_auth() {
        let err = classify_failure("request failed with 401");
        assert_eq!(err.code(), ErrorCode::AuthError);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_classify_timeout_and_network() {
        assert_eq!(classify_failure("request timed out").code(), ErrorCode::Timeout);
        assert_eq!(
            classify_failure("network unreachable").code(),
            ErrorCode::NetworkError
        );
    }

    #[test]
    fn test_category_buckets() {
        assert_eq!(
            FailureCategory::from_message("unknown template variable"),
            FailureCategory::Prompt
        );
        assert_eq!(
            FailureCategory::from_message("MCP bridge unavailable"),
            FailureCategory::Mcp
        );
        assert_eq!(
            FailureCategory::from_message("failed to extract main content"),
            FailureCategory::Extraction
        );
        assert_eq!(
            FailureCategory::from_message("DOM handle was stale"),
            FailureCategory::Extraction
        );
        assert_eq!(
            FailureCategory::from_message("network timeout while dispatching"),
            FailureCategory::Network
        );
        // The taxonomy's own timeout rendering says "timed out".
        assert_eq!(
            FailureCategory::from_message(&AiError::timeout("no response within 30s").to_string()),
            FailureCategory::Network
        );
        assert_eq!(
            FailureCategory::from_message("something else entirely"),
            FailureCategory::System
        );
    }
}
