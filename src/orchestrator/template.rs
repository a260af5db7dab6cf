//! Prompt template substitution
//!
//! Recognized placeholders resolve from the page context; anything else is
//! left untouched so authors can iterate on templates without hard failures.

use crate::types::WebsiteContext;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_.-]+)\s*\}\}").expect("valid pattern"));

/// Rendered template plus the placeholders that did not resolve.
#[derive(Debug, Clone)]
pub struct RenderedTemplate {
    pub text: String,
    /// Placeholder names left untouched in the output.
    pub unresolved: Vec<String>,
}

/// Substitutes recognized placeholders into a template.
///
/// Recognized names: `domain`, `pageTitle` (with `title` as an accepted
/// alias), any extracted-data field, and any user-input key. Unrecognized
/// placeholders stay verbatim.
pub fn render(
    template: &str,
    context: &WebsiteContext,
    user_input: Option<&HashMap<String, String>>,
) -> RenderedTemplate {
    let mut unresolved = Vec::new();

    let text = PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let name = &caps[1];
            match resolve(name, context, user_input) {
                Some(value) => value,
                None => {
                    unresolved.push(name.to_string());
                    caps[0].to_string()
                }
            }
        })
        .into_owned();

    RenderedTemplate { text, unresolved }
}

fn resolve(
    name: &str,
    context: &WebsiteContext,
    user_input: Option<&HashMap<String, String>>,
) -> Option<String> {
    match name {
        "domain" => return Some(context.domain.clone()),
        // "title" is an accepted alias for "pageTitle"; both resolve to the
        // identical value.
        "title" | "pageTitle" => {
            return context
                .extracted_text("pageTitle")
                .or_else(|| context.extracted_text("title"));
        }
        _ => {}
    }

    if let Some(value) = context.extracted_text(name) {
        return Some(value);
    }

    user_input.and_then(|input| input.get(name).cloned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> WebsiteContext {
        WebsiteContext::new("example.com", "news")
            .with_extracted("pageTitle", "Test Page")
            .with_extracted("price", "42.00")
    }

    #[test]
    fn test_domain_and_title_substitution() {
        let rendered = render(
            "Analyze {{domain}} page with title {{pageTitle}}",
            &context(),
            None,
        );
        assert_eq!(rendered.text, "Analyze example.com page with title Test Page");
        assert!(rendered.unresolved.is_empty());
        assert!(!rendered.text.contains("{{"));
    }

    #[test]
    fn test_title_alias_matches_page_title() {
        let rendered = render("{{title}} == {{pageTitle}}", &context(), None);
        assert_eq!(rendered.text, "Test Page == Test Page");
    }

    #[test]
    fn test_alias_falls_back_to_title_field() {
        let ctx = WebsiteContext::new("example.com", "news").with_extracted("title", "Only Title");
        let rendered = render("{{pageTitle}}", &ctx, None);
        assert_eq!(rendered.text, "Only Title");
    }

    #[test]
    fn test_extracted_field_substitution() {
        let rendered = render("Price is {{price}}", &context(), None);
        assert_eq!(rendered.text, "Price is 42.00");
    }

    #[test]
    fn test_unknown_placeholder_left_untouched() {
        let rendered = render("Hello {{nonexistent}}", &context(), None);
        assert_eq!(rendered.text, "Hello {{nonexistent}}");
        assert_eq!(rendered.unresolved, vec!["nonexistent"]);
    }

    #[test]
    fn test_user_input_resolves_last() {
        let mut input = HashMap::new();
        input.insert("audience".to_string(), "engineers".to_string());
        let rendered = render("For {{audience}}", &context(), Some(&input));
        assert_eq!(rendered.text, "For engineers");
    }

    #[test]
    fn test_whitespace_inside_braces() {
        let rendered = render("{{ domain }}", &context(), None);
        assert_eq!(rendered.text, "example.com");
    }
}
