//! PII and credential detection patterns
//!
//! Pre-compiled and known-good; compile failures would be a code error
//! caught by the tests below.

use once_cell::sync::Lazy;
use regex::Regex;

/// Credit card: XXXX-XXXX-XXXX-XXXX, with spaces, dashes, or neither.
pub static CREDIT_CARD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{4}[\s-]?\d{4}[\s-]?\d{4}[\s-]?\d{4}\b").expect("valid pattern"));

/// SSN: XXX-XX-XXXX.
pub static SSN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").expect("valid pattern"));

/// Phone: XXX-XXX-XXXX.
pub static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{3}-\d{3}-\d{4}\b").expect("valid pattern"));

/// Email: local@domain.tld.
pub static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("valid pattern")
});

/// Provider-style API keys: `sk-` / `pk-` / `api-` prefix plus a long tail.
pub static API_KEY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:sk|pk|api)[-_][A-Za-z0-9_-]{16,}\b").expect("valid pattern"));

/// Password assignments: `password: value`, `passwd=value`, `pwd = value`.
pub static PASSWORD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\b(?:password|passwd|pwd)\s*[:=]\s*\S+"#).expect("valid pattern")
});
