//! Content sanitization and dispatch-time security checks
//!
//! The rule set is consumed through three contracts: `generate_warnings`
//! (error-level findings block dispatch), `sanitize` (PII redaction), and
//! `create_constraints` (per-context limits).

mod patterns;

pub use patterns::{
    API_KEY_PATTERN, CREDIT_CARD_PATTERN, EMAIL_PATTERN, PASSWORD_PATTERN, PHONE_PATTERN,
    SSN_PATTERN,
};

use crate::types::{
    AIConstraints, AIRequest, SecurityLevel, SecurityWarning, WebsiteContext,
};
use std::borrow::Cow;

/// Redacts credit card, SSN, phone, email, API-key, and password patterns.
pub fn sanitize(text: &str) -> String {
    let mut out: Cow<str> = Cow::Borrowed(text);
    for (pattern, marker) in [
        (&*CREDIT_CARD_PATTERN, "[REDACTED-CARD]"),
        (&*SSN_PATTERN, "[REDACTED-SSN]"),
        (&*PHONE_PATTERN, "[REDACTED-PHONE]"),
        (&*EMAIL_PATTERN, "[REDACTED-EMAIL]"),
        (&*API_KEY_PATTERN, "[REDACTED-KEY]"),
        (&*PASSWORD_PATTERN, "[REDACTED-PASSWORD]"),
    ] {
        if pattern.is_match(&out) {
            out = Cow::Owned(pattern.replace_all(&out, marker).into_owned());
        }
    }
    out.into_owned()
}

/// Whether the text contains any pattern `sanitize` would redact.
pub fn contains_sensitive(text: &str) -> bool {
    CREDIT_CARD_PATTERN.is_match(text)
        || SSN_PATTERN.is_match(text)
        || PHONE_PATTERN.is_match(text)
        || EMAIL_PATTERN.is_match(text)
        || API_KEY_PATTERN.is_match(text)
        || PASSWORD_PATTERN.is_match(text)
}

/// Evaluates a request against its page context.
///
/// Ordered findings; any error-level warning blocks dispatch.
pub fn generate_warnings(context: &WebsiteContext, request: &AIRequest) -> Vec<SecurityWarning> {
    let mut warnings = Vec::new();

    if context.security_level.is_sensitive() && request.constraints.allow_sensitive_data {
        warnings.push(SecurityWarning::error(
            "sensitive-page-passthrough",
            "sensitive data passthrough is not permitted on this page",
        ));
    }

    if !request.constraints.allowed_domains.is_empty()
        && !request
            .constraints
            .allowed_domains
            .iter()
            .any(|d| d == &context.domain)
    {
        warnings.push(SecurityWarning::error(
            "domain-not-allowed",
            format!("domain {} is outside the allowed set", context.domain),
        ));
    }

    if contains_sensitive(&request.prompt) {
        warnings.push(SecurityWarning::warn(
            "pii-in-prompt",
            "prompt contains data matching PII patterns; it will be redacted",
        ));
    }

    if context
        .extracted_data
        .values()
        .filter_map(|v| v.as_str())
        .any(contains_sensitive)
    {
        warnings.push(SecurityWarning::warn(
            "pii-in-context",
            "extracted page data matches PII patterns; it will be redacted",
        ));
    }

    if context.security_level == SecurityLevel::Restricted {
        warnings.push(SecurityWarning::warn(
            "restricted-page",
            "page is classified restricted; only minimal context is forwarded",
        ));
    }

    warnings
}

/// Builds the constraint bundle for a page context.
pub fn create_constraints(context: &WebsiteContext) -> AIConstraints {
    let base = AIConstraints::default();
    match context.security_level {
        SecurityLevel::Public => base,
        SecurityLevel::Internal => AIConstraints {
            allowed_domains: vec![context.domain.clone()],
            ..base
        },
        SecurityLevel::Sensitive | SecurityLevel::Restricted => AIConstraints {
            max_content_length: 2_000,
            allowed_domains: vec![context.domain.clone()],
            restricted_selectors: vec![
                "input[type=password]".to_string(),
                "input[type=email]".to_string(),
                "[autocomplete=cc-number]".to_string(),
            ],
            allow_sensitive_data: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TaskType, WarningLevel};

    fn context(level: SecurityLevel) -> WebsiteContext {
        WebsiteContext::new("bank.example.com", "finance").with_security_level(level)
    }

    #[test]
    fn test_sanitize_redacts_all_pattern_families() {
        let text = "card 4111-1111-1111-1111, ssn 123-45-6789, call 555-123-4567, \
                    mail a@b.com, key sk-abcdefabcdefabcdefabcdef, password: hunter2";
        let clean = sanitize(text);

        assert!(clean.contains("[REDACTED-CARD]"));
        assert!(clean.contains("[REDACTED-SSN]"));
        assert!(clean.contains("[REDACTED-PHONE]"));
        assert!(clean.contains("[REDACTED-EMAIL]"));
        assert!(clean.contains("[REDACTED-KEY]"));
        assert!(clean.contains("[REDACTED-PASSWORD]"));
        assert!(!clean.contains("hunter2"));
    }

    #[test]
    fn test_sanitize_leaves_clean_text_alone() {
        let text = "Ordinary page text with numbers like 12345.";
        assert_eq!(sanitize(text), text);
    }

    #[test]
    fn test_sensitive_passthrough_is_blocking() {
        let ctx = context(SecurityLevel::Sensitive);
        let mut request = AIRequest::new("analyze", ctx.clone(), TaskType::Analyze);
        request.constraints.allow_sensitive_data = true;

        let warnings = generate_warnings(&ctx, &request);
        assert!(warnings.iter().any(|w| w.level == WarningLevel::Error));
    }

    #[test]
    fn test_disallowed_domain_is_blocking() {
        let ctx = context(SecurityLevel::Public);
        let mut request = AIRequest::new("analyze", ctx.clone(), TaskType::Analyze);
        request.constraints.allowed_domains = vec!["other.example.com".to_string()];

        let warnings = generate_warnings(&ctx, &request);
        assert!(warnings
            .iter()
            .any(|w| w.level == WarningLevel::Error && w.code == "domain-not-allowed"));
    }

    #[test]
    fn test_pii_prompt_warns_without_blocking() {
        let ctx = context(SecurityLevel::Public);
        let request = AIRequest::new(
            "summarize page mentioning a@b.com",
            ctx.clone(),
            TaskType::Summarize,
        );

        let warnings = generate_warnings(&ctx, &request);
        assert!(warnings.iter().all(|w| w.level == WarningLevel::Warn));
        assert!(warnings.iter().any(|w| w.code == "pii-in-prompt"));
    }

    #[test]
    fn test_pii_in_extracted_context_warns() {
        let ctx = context(SecurityLevel::Public)
            .with_extracted("pageContent", "reach me at jane@corp.example");
        let request = AIRequest::new("summarize", ctx.clone(), TaskType::Summarize);

        let warnings = generate_warnings(&ctx, &request);
        assert!(warnings
            .iter()
            .any(|w| w.code == "pii-in-context" && w.level == WarningLevel::Warn));
    }

    #[test]
    fn test_constraints_tighten_with_security_level() {
        let open = create_constraints(&context(SecurityLevel::Public));
        assert!(open.restricted_selectors.is_empty());

        let tight = create_constraints(&context(SecurityLevel::Restricted));
        assert!(tight.max_content_length < open.max_content_length);
        assert_eq!(tight.allowed_domains, vec!["bank.example.com"]);
        assert!(!tight.allow_sensitive_data);
        assert!(!tight.restricted_selectors.is_empty());
    }
}
