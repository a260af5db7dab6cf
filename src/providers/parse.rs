//! Wire-response post-processing shared by all adapters

use crate::error::{AiError, Result};
use crate::types::{AIRequest, AIResponse, AutomationStep, MAX_SUGGESTIONS};
use once_cell::sync::Lazy;
use regex::Regex;

/// Confidence used when the provider exposes no log-probabilities.
pub const DEFAULT_CONFIDENCE: f64 = 0.8;

/// Matches numbered ("1." / "2)") and bulleted ("-", "*", "•") list lines.
static LIST_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:\d+[.)]|[-*•])\s+(.+?)\s*$").expect("list item pattern is valid")
});

/// Average token log-probabilities into a `[0, 1]` confidence.
///
/// `exp(mean log p)` is the geometric mean token probability; an empty slice
/// falls back to [`DEFAULT_CONFIDENCE`].
pub fn confidence_from_logprobs(logprobs: &[f64]) -> f64 {
    if logprobs.is_empty() {
        return DEFAULT_CONFIDENCE;
    }
    let mean = logprobs.iter().sum::<f64>() / logprobs.len() as f64;
    mean.exp().clamp(0.0, 1.0)
}

/// Extracts up to [`MAX_SUGGESTIONS`] ordered suggestions from free text.
pub fn extract_suggestions(text: &str) -> Vec<String> {
    LIST_ITEM
        .captures_iter(text)
        .take(MAX_SUGGESTIONS)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// Extracts ordered automation steps from free text.
///
/// Every list line becomes a step; prose without list structure yields none.
pub fn extract_automation_steps(text: &str) -> Vec<AutomationStep> {
    LIST_ITEM
        .captures_iter(text)
        .enumerate()
        .map(|(idx, cap)| AutomationStep {
            order: idx + 1,
            description: cap[1].to_string(),
        })
        .collect()
}

/// Builds the canonical response from parsed wire content.
///
/// Rejects empty bodies and attaches the optional sections the request's
/// task type asks for.
pub fn finalize(
    request: &AIRequest,
    content: String,
    confidence: f64,
    request_id: String,
) -> Result<AIResponse> {
    if content.trim().is_empty() {
        return Err(AiError::parse("provider returned empty content"));
    }

    let mut response = AIResponse::new(content, request.output_format, request_id)
        .with_confidence(confidence);

    if request.task_type.wants_suggestions() {
        let suggestions = extract_suggestions(&response.content);
        if !suggestions.is_empty() {
            response = response.with_suggestions(suggestions);
        }
    }

    if request.task_type.wants_automation_steps() {
        let steps = extract_automation_steps(&response.content);
        if !steps.is_empty() {
            response = response.with_automation_steps(steps);
        }
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TaskType, WebsiteContext};

    fn request(task_type: TaskType) -> AIRequest {
        AIRequest::new(
            "prompt",
            WebsiteContext::new("example.com", "news"),
            task_type,
        )
    }

    #[test]
    fn test_confidence_from_logprobs_geometric_mean() {
        // ln(0.5) for every token -> confidence 0.5
        let logprobs = vec![0.5_f64.ln(); 4];
        let confidence = confidence_from_logprobs(&logprobs);
        assert!((confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_defaults_when_absent() {
        assert_eq!(confidence_from_logprobs(&[]), DEFAULT_CONFIDENCE);
    }

    #[test]
    fn test_extract_suggestions_mixed_markers() {
        let text = "Here are options:\n1. First\n2) Second\n- Third\n* Fourth\n• Fifth\n6. Sixth";
        let suggestions = extract_suggestions(text);
        assert_eq!(
            suggestions,
            vec!["First", "Second", "Third", "Fourth", "Fifth"]
        );
    }

    #[test]
    fn test_extract_automation_steps_ordered() {
        let text = "1. Open the menu\n2. Click settings\n3. Save";
        let steps = extract_automation_steps(text);
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].order, 1);
        assert_eq!(steps[2].description, "Save");
    }

    #[test]
    fn test_finalize_rejects_empty_content() {
        let err = finalize(&request(TaskType::Summarize), "  \n".into(), 0.8, "r".into());
        assert!(err.is_err());
    }

    #[test]
    fn test_finalize_attaches_sections_by_task_type() {
        let content = "1. Check the price\n2. Compare reviews".to_string();

        let with = finalize(&request(TaskType::Suggest), content.clone(), 0.8, "r".into()).unwrap();
        assert!(with.suggestions.is_some());

        let without = finalize(&request(TaskType::Summarize), content, 0.8, "r".into()).unwrap();
        assert!(without.suggestions.is_none());
    }
}
