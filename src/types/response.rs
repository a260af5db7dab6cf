//! Canonical AI response types

use super::request::OutputFormat;
use super::ProviderKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of extracted suggestions carried on a response.
pub const MAX_SUGGESTIONS: usize = 5;

/// A single step of a proposed page automation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationStep {
    /// 1-based position in the proposed sequence.
    pub order: usize,
    pub description: String,
}

/// Severity of a security warning attached to a request or response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningLevel {
    Warn,
    /// Blocks dispatch entirely.
    Error,
}

/// A security finding raised before dispatch or carried on a response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityWarning {
    pub level: WarningLevel,
    pub code: String,
    pub message: String,
}

impl SecurityWarning {
    pub fn warn(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: WarningLevel::Warn,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: WarningLevel::Error,
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Records that a fallback provider answered in place of the selected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSubstitution {
    pub original: ProviderKind,
    pub used: ProviderKind,
}

/// Canonical response produced by any provider adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AIResponse {
    /// Generated content; non-empty on success.
    pub content: String,
    pub format: OutputFormat,
    /// Model confidence in `[0, 1]`; averaged from logprobs when available.
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
    pub request_id: String,
    /// Ordered, at most [`MAX_SUGGESTIONS`] entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automation_steps: Option<Vec<AutomationStep>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_warnings: Option<Vec<SecurityWarning>>,
    /// Present when a fallback provider produced this response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substitution: Option<ProviderSubstitution>,
}

impl AIResponse {
    pub fn new(content: impl Into<String>, format: OutputFormat, request_id: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            format,
            confidence: 0.0,
            timestamp: Utc::now(),
            request_id: request_id.into(),
            suggestions: None,
            automation_steps: None,
            security_warnings: None,
            substitution: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_suggestions(mut self, mut suggestions: Vec<String>) -> Self {
        suggestions.truncate(MAX_SUGGESTIONS);
        self.suggestions = Some(suggestions);
        self
    }

    pub fn with_automation_steps(mut self, steps: Vec<AutomationStep>) -> Self {
        self.automation_steps = Some(steps);
        self
    }

    pub fn with_substitution(mut self, substitution: ProviderSubstitution) -> Self {
        self.substitution = Some(substitution);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_is_clamped() {
        let resp = AIResponse::new("ok", OutputFormat::Text, "req-1").with_confidence(1.7);
        assert_eq!(resp.confidence, 1.0);

        let resp = AIResponse::new("ok", OutputFormat::Text, "req-1").with_confidence(-0.2);
        assert_eq!(resp.confidence, 0.0);
    }

    #[test]
    fn test_suggestions_are_capped() {
        let items: Vec<String> = (0..8).map(|i| format!("option {i}")).collect();
        let resp = AIResponse::new("ok", OutputFormat::Text, "req-1").with_suggestions(items);
        assert_eq!(resp.suggestions.unwrap().len(), MAX_SUGGESTIONS);
    }
}
