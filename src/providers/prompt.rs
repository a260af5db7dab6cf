//! Shared prompt assembly
//!
//! All adapters build the same two-part prompt: an optional system
//! instruction plus a user message carrying the request prompt, a serialized
//! context block, and any user-supplied additions.

use crate::types::{AIRequest, OutputFormat, TaskType, WebsiteContext};

/// Assembled prompt ready for wire translation.
#[derive(Debug, Clone)]
pub struct AssembledPrompt {
    /// Present only when the request has no task id.
    pub system: Option<String>,
    pub user: String,
}

/// Builds the prompt for a request.
///
/// Without a `task_id`, a system prompt keyed by task type and output format
/// frames the request. With one, the stored template already carries the full
/// instruction, so the request's own prompt is promoted to primary and no
/// system prompt is prepended.
pub fn assemble(request: &AIRequest) -> AssembledPrompt {
    let system = if request.task_id.is_none() {
        Some(system_prompt(request.task_type, request.output_format))
    } else {
        None
    };

    let mut user = request.prompt.clone();
    user.push_str("\n\n");
    user.push_str(&context_block(
        &request.context,
        request.constraints.max_content_length,
    ));

    if let Some(input) = &request.user_input {
        if !input.is_empty() {
            user.push_str("\n\nAdditional input:\n");
            let mut keys: Vec<_> = input.keys().collect();
            keys.sort();
            for key in keys {
                user.push_str(&format!("- {}: {}\n", key, input[key]));
            }
        }
    }

    AssembledPrompt { system, user }
}

/// System prompt keyed by task type and output format.
pub fn system_prompt(task_type: TaskType, format: OutputFormat) -> String {
    let role = match task_type {
        TaskType::Summarize => "You summarize web pages concisely and factually.",
        TaskType::Analyze => "You analyze web pages and point out what matters on them.",
        TaskType::Generate => "You generate text grounded in the given page context.",
        TaskType::Suggest => "You propose concrete next actions for the current page, as a numbered list.",
        TaskType::Automate => "You break page interactions into explicit, ordered automation steps.",
    };

    let shape = match format {
        OutputFormat::Text => "Respond in plain text.",
        OutputFormat::Markdown => "Respond in Markdown.",
        OutputFormat::Json => "Respond with a single valid JSON object and nothing else.",
    };

    format!("{role} {shape}")
}

/// Serializes the page context into a block appended to every prompt.
///
/// Extracted data is emitted in sorted key order so identical contexts
/// produce identical prompts (and identical cache keys).
pub fn context_block(context: &WebsiteContext, max_content_length: usize) -> String {
    let mut block = String::from("Page context:\n");
    block.push_str(&format!("- domain: {}\n", context.domain));
    block.push_str(&format!("- category: {}\n", context.category));
    block.push_str(&format!("- page type: {}\n", context.page_type));
    block.push_str(&format!(
        "- security level: {:?}\n",
        context.security_level
    ));

    if !context.extracted_data.is_empty() {
        block.push_str("- extracted data:\n");
        let mut keys: Vec<_> = context.extracted_data.keys().collect();
        keys.sort();
        for key in keys {
            let value = context.extracted_text(key).unwrap_or_default();
            block.push_str(&format!("  - {key}: {value}\n"));
        }
    }

    truncate_chars(&block, max_content_length)
}

/// Truncates on a character boundary so multi-byte content never splits.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}
