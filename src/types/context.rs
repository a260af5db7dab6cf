//! Website context captured from the active page

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Sensitivity classification of the page the assistant is operating on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityLevel {
    Public,
    Internal,
    Sensitive,
    Restricted,
}

impl Default for SecurityLevel {
    fn default() -> Self {
        Self::Public
    }
}

impl SecurityLevel {
    /// Levels at which personal or credential data must never leave the page.
    pub fn is_sensitive(&self) -> bool {
        matches!(self, Self::Sensitive | Self::Restricted)
    }
}

/// Snapshot of the active page at the moment a task was triggered.
///
/// Immutable after construction; enrichment passes build a new context via
/// [`WebsiteContext::with_extracted`] rather than mutating in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebsiteContext {
    pub domain: String,
    pub category: String,
    pub page_type: String,
    pub security_level: SecurityLevel,
    pub extracted_data: HashMap<String, serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

impl Default for WebsiteContext {
    fn default() -> Self {
        Self::new("unknown", "uncategorized")
    }
}

impl WebsiteContext {
    pub fn new(domain: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            category: category.into(),
            page_type: "general".to_string(),
            security_level: SecurityLevel::default(),
            extracted_data: HashMap::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_page_type(mut self, page_type: impl Into<String>) -> Self {
        self.page_type = page_type.into();
        self
    }

    pub fn with_security_level(mut self, level: SecurityLevel) -> Self {
        self.security_level = level;
        self
    }

    /// Returns a copy carrying an additional extracted field.
    pub fn with_extracted(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.extracted_data.insert(key.into(), value.into());
        self
    }

    /// Extracted field as plain text, if present and scalar.
    pub fn extracted_text(&self, key: &str) -> Option<String> {
        self.extracted_data.get(key).map(|v| match v {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_extracted_produces_copy() {
        let base = WebsiteContext::new("example.com", "shopping");
        let derived = base.clone().with_extracted("pageTitle", "Cart");

        assert!(base.extracted_data.is_empty());
        assert_eq!(
            derived.extracted_text("pageTitle").as_deref(),
            Some("Cart")
        );
    }

    #[test]
    fn test_security_level_sensitivity() {
        assert!(!SecurityLevel::Public.is_sensitive());
        assert!(!SecurityLevel::Internal.is_sensitive());
        assert!(SecurityLevel::Sensitive.is_sensitive());
        assert!(SecurityLevel::Restricted.is_sensitive());
    }
}
