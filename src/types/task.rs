//! Stored task definitions and execution results

use super::request::{OutputFormat, TaskType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user-defined prompt template bound to URL patterns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDefinition {
    pub id: String,
    pub name: String,
    /// Template text with `{{placeholder}}` variables.
    pub prompt_template: String,
    pub url_patterns: Vec<String>,
    pub task_type: TaskType,
    pub output_format: OutputFormat,
    pub enabled: bool,
}

impl TaskDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            prompt_template: template.into(),
            url_patterns: Vec::new(),
            task_type: TaskType::Analyze,
            output_format: OutputFormat::Text,
            enabled: true,
        }
    }
}

/// Structured debugging payload attached to a failed execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDebugInfo {
    /// One of `prompt`, `mcp`, `extraction`, `network`, `system`.
    pub error_type: String,
    pub technical_details: String,
    pub suggested_fix: String,
    pub timestamp: DateTime<Utc>,
}

/// Outcome of a single task execution. Not persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_info: Option<TaskDebugInfo>,
}

impl TaskResult {
    pub fn success(content: impl Into<String>, format: OutputFormat) -> Self {
        Self {
            success: true,
            content: Some(content.into()),
            format: Some(format),
            error: None,
            debug_info: None,
        }
    }

    pub fn failure(error: impl Into<String>, debug_info: TaskDebugInfo) -> Self {
        Self {
            success: false,
            content: None,
            format: None,
            error: Some(error.into()),
            debug_info: Some(debug_info),
        }
    }
}

/// Outcome of pre-execution validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Blocking problems; execution must not proceed while non-empty.
    pub errors: Vec<String>,
    /// Non-blocking observations.
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_blocking(&self) -> bool {
        !self.errors.is_empty()
    }
}
