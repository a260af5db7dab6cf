//! External collaborator seams
//!
//! Storage, DOM extraction, and auxiliary context are owned by other
//! subsystems; the orchestrator consumes them through these traits.

use crate::error::Result;
use crate::types::{TaskDefinition, WebsiteContext};
use async_trait::async_trait;
use std::collections::HashMap;

/// Opaque handle to a live document, owned by the extraction subsystem.
pub type DocumentHandle = serde_json::Value;

/// Structured content produced by intelligent extraction.
#[derive(Debug, Clone, Default)]
pub struct ExtractedContent {
    pub title: Option<String>,
    pub main_text: String,
    pub metadata: HashMap<String, String>,
}

/// Persistent task definitions and usage accounting.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn get_task(&self, id: &str) -> Result<Option<TaskDefinition>>;
    async fn record_usage(&self, id: &str, success: bool, elapsed_ms: u64) -> Result<()>;
}

/// DOM-based page content extraction.
#[cfg_attr(test, mockall::automock)]
pub trait ContentExtractor: Send + Sync {
    /// Structured extraction from a live document handle.
    fn extract_clean_content(&self, document: &DocumentHandle) -> Result<ExtractedContent>;

    /// Lighter noise-removal pass over raw page text.
    fn remove_noise(&self, raw: &str) -> String;
}

/// Best-effort auxiliary context assembly. May fail; callers degrade to
/// proceeding without the bundle.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContextBundleBuilder: Send + Sync {
    async fn build<'a>(
        &self,
        context: &WebsiteContext,
        page_content: &str,
        preferences: Option<&'a serde_json::Value>,
        tasks: Option<&'a [TaskDefinition]>,
    ) -> Result<serde_json::Value>;
}
