//! Task orchestration
//!
//! Turns a stored task into a routed AI request: resolve, validate,
//! template, enrich (best effort), dispatch, record usage, and classify
//! failures into user-facing buckets. Enrichment never blocks primary
//! generation; extraction and auxiliary-context failures degrade with a
//! warning instead of failing the task.

mod template;
mod traits;


pub use template::{render, RenderedTemplate};
pub use traits::{
    ContentExtractor, ContextBundleBuilder, DocumentHandle, ExtractedContent, TaskStore,
};

#[cfg(test)]
pub(crate) use traits::{MockContentExtractor, MockContextBundleBuilder, MockTaskStore};

use crate::error::FailureCategory;
use crate::router::ProviderRouter;
use crate::security;
use crate::types::{
    AIRequest, TaskDebugInfo, TaskDefinition, TaskResult, ValidationReport, WarningLevel,
    WebsiteContext,
};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Marker embedded in every dry-run result.
pub const SIMULATED_MARKER: &str = "[simulated]";

/// State the caller captured from the active page for one execution.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    pub context: WebsiteContext,
    /// Raw page content as captured.
    pub page_content: String,
    /// Live document handle, when the page is still attached.
    pub document: Option<DocumentHandle>,
    pub user_input: Option<HashMap<String, String>>,
    pub preferences: Option<serde_json::Value>,
}

/// Per-call execution switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionOptions {
    /// Build the real prompt but fabricate the result locally; no provider
    /// contact.
    pub dry_run: bool,
    /// Run full validation first; blocking errors short-circuit.
    pub validate_before_execution: bool,
}

/// Coordinates task resolution, prompt construction, enrichment, and
/// dispatch through the provider router.
pub struct TaskOrchestrator {
    router: Arc<ProviderRouter>,
    store: Arc<dyn TaskStore>,
    extractor: Option<Arc<dyn ContentExtractor>>,
    bundle_builder: Option<Arc<dyn ContextBundleBuilder>>,
}

impl TaskOrchestrator {
    pub fn new(router: Arc<ProviderRouter>, store: Arc<dyn TaskStore>) -> Self {
        Self {
            router,
            store,
            extractor: None,
            bundle_builder: None,
        }
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn ContentExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn with_bundle_builder(mut self, builder: Arc<dyn ContextBundleBuilder>) -> Self {
        self.bundle_builder = Some(builder);
        self
    }

    /// Executes a stored task against the captured page state.
    pub async fn execute_task(
        &self,
        task_id: &str,
        execution: &ExecutionContext,
        options: ExecutionOptions,
    ) -> TaskResult {
        let started = Instant::now();

        let task = match self.store.get_task(task_id).await {
            Ok(Some(task)) => task,
            Ok(None) => {
                return failure(format!("Task {task_id} not found"));
            }
            Err(err) => {
                return failure(format!("Task lookup failed: {err}"));
            }
        };

        if !task.enabled {
            return failure(format!("Task {task_id} is disabled"));
        }

        if options.validate_before_execution {
            let report = self.validate_task(&task, execution);
            if report.is_blocking() {
                return failure(format!(
                    "Task template validation failed: {}",
                    report.errors.join("; ")
                ));
            }
        }

        // Prompt building always runs, dry runs included, so simulated
        // output reflects the real template.
        let rendered = render(&task.prompt_template, &execution.context, execution.user_input.as_ref());
        if !rendered.unresolved.is_empty() {
            debug!(
                task = task_id,
                placeholders = ?rendered.unresolved,
                "leaving unrecognized placeholders untouched"
            );
        }

        if options.dry_run {
            debug!(task = task_id, "dry run, skipping provider dispatch");
            return TaskResult::success(
                format!(
                    "{SIMULATED_MARKER} task '{}' would send:\n{}",
                    task.name, rendered.text
                ),
                task.output_format,
            );
        }

        let result = self.dispatch(&task, execution, rendered.text).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        if let Err(err) = self
            .store
            .record_usage(task_id, result.success, elapsed_ms)
            .await
        {
            warn!(task = task_id, error = %err, "failed to record task usage");
        }

        result
    }

    /// Full pre-execution validation of a task against the captured state.
    pub fn validate_task(&self, task: &TaskDefinition, execution: &ExecutionContext) -> ValidationReport {
        let mut report = ValidationReport::default();

        if task.prompt_template.trim().is_empty() {
            report
                .errors
                .push("prompt template is empty".to_string());
        }

        let rendered = render(&task.prompt_template, &execution.context, execution.user_input.as_ref());
        for name in rendered.unresolved {
            report.warnings.push(format!(
                "template variable {{{{{name}}}}} does not resolve on this page"
            ));
        }

        if execution.page_content.is_empty() && execution.document.is_none() {
            report
                .warnings
                .push("no page content captured; context will be thin".to_string());
        }

        report
    }

    /// Builds the final request and routes it, classifying any failure.
    async fn dispatch(
        &self,
        task: &TaskDefinition,
        execution: &ExecutionContext,
        prompt: String,
    ) -> TaskResult {
        let (mut content, extraction_tag) = self.enhance_content(execution);
        let context = execution
            .context
            .clone()
            .with_extracted("pageContent", content.clone())
            .with_extracted("contentExtraction", extraction_tag);

        let constraints = security::create_constraints(&context);

        let mut request = AIRequest::new(prompt, context.clone(), task.task_type)
            .with_output_format(task.output_format)
            .with_constraints(constraints)
            .with_task_id(&task.id);
        if let Some(input) = &execution.user_input {
            request = request.with_user_input(input.clone());
        }

        // Findings are evaluated against the text as captured; redaction
        // runs afterwards, on everything the wire prompt will carry.
        let warnings = security::generate_warnings(&context, &request);
        if let Some(blocker) = warnings.iter().find(|w| w.level == WarningLevel::Error) {
            return failure(format!(
                "Dispatch blocked by security policy: {} ({})",
                blocker.message, blocker.code
            ));
        }
        for finding in &warnings {
            debug!(task = %task.id, code = %finding.code, "security finding");
        }

        if !request.constraints.allow_sensitive_data {
            content = security::sanitize(&content);
            request.context = request
                .context
                .clone()
                .with_extracted("pageContent", content.clone());
            let clean_prompt = security::sanitize(&request.prompt);
            request = request.with_sanitized_prompt(clean_prompt);
        }

        // Auxiliary context is best effort; a failed build degrades to
        // proceeding without it.
        if let Some(builder) = &self.bundle_builder {
            match builder
                .build(
                    &request.context,
                    &content,
                    execution.preferences.as_ref(),
                    Some(std::slice::from_ref(task)),
                )
                .await
            {
                Ok(bundle) => request = request.with_aux_context(bundle),
                Err(err) => {
                    warn!(task = %task.id, error = %err, "auxiliary context build failed, proceeding without");
                }
            }
        }

        match self.router.process_request_with_fallback(request).await {
            Ok(response) => {
                info!(
                    task = %task.id,
                    confidence = response.confidence,
                    substituted = response.substitution.is_some(),
                    "task completed"
                );
                TaskResult::success(response.content, response.format)
            }
            Err(err) => failure(err.to_string()),
        }
    }

    /// Opportunistic page-content enhancement.
    ///
    /// A live document yields structured extraction tagged `intelligent`;
    /// otherwise a noise-removal pass is tagged `basic-cleanup`. Extraction
    /// failure falls back to the original content rather than failing.
    fn enhance_content(&self, execution: &ExecutionContext) -> (String, &'static str) {
        let Some(extractor) = &self.extractor else {
            return (execution.page_content.clone(), "raw");
        };

        if let Some(document) = &execution.document {
            match extractor.extract_clean_content(document) {
                Ok(extracted) => {
                    debug!("intelligent extraction succeeded");
                    return (extracted.main_text, "intelligent");
                }
                Err(err) => {
                    warn!(error = %err, "extraction failed, using original page content");
                    return (execution.page_content.clone(), "extraction-failed");
                }
            }
        }

        (
            extractor.remove_noise(&execution.page_content),
            "basic-cleanup",
        )
    }
}

/// Classifies a raw failure message and wraps it in a `TaskResult`.
fn failure(technical: String) -> TaskResult {
    let category = FailureCategory::from_message(&technical);
    TaskResult::failure(
        category.user_message(),
        TaskDebugInfo {
            error_type: category.as_str().to_string(),
            technical_details: technical,
            suggested_fix: category.suggested_fix().to_string(),
            timestamp: Utc::now(),
        },
    )
}
