//! Provider-agnostic AI request types

use super::context::WebsiteContext;
use crate::error::AiError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What kind of work the model is being asked to do.
///
/// Drives the default system prompt and which optional output sections
/// (suggestions, automation steps) the adapters extract from free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Summarize,
    Analyze,
    Generate,
    Suggest,
    Automate,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Summarize => "summarize",
            Self::Analyze => "analyze",
            Self::Generate => "generate",
            Self::Suggest => "suggest",
            Self::Automate => "automate",
        }
    }

    /// Whether responses for this task type carry an ordered suggestion list.
    pub fn wants_suggestions(&self) -> bool {
        matches!(self, Self::Suggest | Self::Analyze)
    }

    /// Whether responses for this task type carry automation steps.
    pub fn wants_automation_steps(&self) -> bool {
        matches!(self, Self::Automate)
    }
}

/// Requested shape of the generated content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Markdown,
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Text
    }
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Markdown => "markdown",
            Self::Json => "json",
        }
    }
}

/// Hard limits applied to a request before dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AIConstraints {
    /// Upper bound on the page content included in the prompt. Always > 0.
    pub max_content_length: usize,
    /// Domains the request is allowed to reference.
    pub allowed_domains: Vec<String>,
    /// CSS selectors whose content must not be included.
    pub restricted_selectors: Vec<String>,
    /// Whether PII may pass through unsanitized.
    pub allow_sensitive_data: bool,
}

impl Default for AIConstraints {
    fn default() -> Self {
        Self {
            max_content_length: 8_000,
            allowed_domains: Vec::new(),
            restricted_selectors: Vec::new(),
            allow_sensitive_data: false,
        }
    }
}

/// A provider-agnostic generation request.
///
/// Value object: retry, requeue, and sanitization all operate on copies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AIRequest {
    pub prompt: String,
    pub context: WebsiteContext,
    pub task_type: TaskType,
    pub output_format: OutputFormat,
    pub constraints: AIConstraints,
    /// Free-form key/value additions supplied by the user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_input: Option<HashMap<String, String>>,
    /// Set when the prompt came from a stored task template; its presence
    /// makes the prompt the primary instruction instead of a system prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    /// Opaque auxiliary context bundle attached best-effort.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aux_context: Option<serde_json::Value>,
}

impl AIRequest {
    pub fn new(prompt: impl Into<String>, context: WebsiteContext, task_type: TaskType) -> Self {
        Self {
            prompt: prompt.into(),
            context,
            task_type,
            output_format: OutputFormat::default(),
            constraints: AIConstraints::default(),
            user_input: None,
            task_id: None,
            aux_context: None,
        }
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn with_constraints(mut self, constraints: AIConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_task_id(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    pub fn with_user_input(mut self, input: HashMap<String, String>) -> Self {
        self.user_input = Some(input);
        self
    }

    pub fn with_aux_context(mut self, aux: serde_json::Value) -> Self {
        self.aux_context = Some(aux);
        self
    }

    /// Pre-dispatch schema validation.
    pub fn validate(&self) -> Result<(), AiError> {
        if self.prompt.trim().is_empty() {
            return Err(AiError::invalid_request("prompt must not be empty"));
        }
        if self.constraints.max_content_length == 0 {
            return Err(AiError::invalid_request(
                "max_content_length must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Returns a copy with the prompt replaced by its sanitized form.
    pub fn with_sanitized_prompt(mut self, sanitized: String) -> Self {
        self.prompt = sanitized;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> AIRequest {
        AIRequest::new(
            "Summarize this page",
            WebsiteContext::new("example.com", "news"),
            TaskType::Summarize,
        )
    }

    #[test]
    fn test_validate_rejects_empty_prompt() {
        let mut req = request();
        req.prompt = "   ".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_content_length() {
        let mut req = request();
        req.constraints.max_content_length = 0;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_task_type_output_sections() {
        assert!(TaskType::Suggest.wants_suggestions());
        assert!(TaskType::Automate.wants_automation_steps());
        assert!(!TaskType::Summarize.wants_suggestions());
        assert!(!TaskType::Summarize.wants_automation_steps());
    }
}
