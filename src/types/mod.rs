//! Core value types shared across the pipeline
//!
//! Requests and contexts are value objects: mutation always produces a copy,
//! which keeps retry/requeue and sanitization free of aliasing surprises.

mod context;
mod request;
mod response;
mod task;

pub use context::{SecurityLevel, WebsiteContext};
pub use request::{AIConstraints, AIRequest, OutputFormat, TaskType};
pub use response::{
    AIResponse, AutomationStep, ProviderSubstitution, SecurityWarning, WarningLevel,
    MAX_SUGGESTIONS,
};
pub use task::{TaskDebugInfo, TaskDefinition, TaskResult, ValidationReport};

use serde::{Deserialize, Serialize};

/// Identifies a configured provider backend family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Chat-completion style wire format, bearer authentication.
    OpenAi,
    /// Messages style wire format, API-key header authentication.
    Anthropic,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
