//! Prompt templates for the generation pipeline.
//!
//! Template bodies live in `config/prompts/` and are compiled into the
//! binary. Placeholders use `{{key}}` syntax and are filled in a single pass
//! at [`build()`](PromptBuilder::build) time, so substituted text is never
//! re-scanned for placeholders.

use std::collections::HashMap;

use super::GenerationContext;
use super::content::ContentRequest;
use super::schema::{BusinessAnalysis, DesignSpecs};

const SEPARATOR: &str = "\n\n";

pub const ENHANCED: &str = include_str!("../../config/prompts/enhanced.md");
pub const ENHANCED_FOOTER: &str = include_str!("../../config/prompts/enhanced_footer.md");
pub const BUSINESS_ANALYSIS: &str = include_str!("../../config/prompts/business_analysis.md");
pub const DESIGN_SPECS: &str = include_str!("../../config/prompts/design_specs.md");
pub const WEBSITE_CODE: &str = include_str!("../../config/prompts/website_code.md");
pub const DIRECT_WEBSITE: &str = include_str!("../../config/prompts/direct_website.md");
pub const CONTENT: &str = include_str!("../../config/prompts/content.md");

/// Fluent builder that joins template fragments and fills placeholders.
#[derive(Debug, Default)]
pub struct PromptBuilder {
    parts: Vec<String>,
    vars: HashMap<String, String>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text fragment. Blank fragments are skipped.
    pub fn append(mut self, text: impl Into<String>) -> Self {
        let s = text.into();
        let trimmed = s.trim();
        if !trimmed.is_empty() {
            self.parts.push(trimmed.to_string());
        }
        self
    }

    /// Register a single `{{key}}` substitution.
    pub fn var(mut self, key: &str, value: impl Into<String>) -> Self {
        self.vars.insert(key.to_string(), value.into());
        self
    }

    /// Register several substitutions.
    pub fn with_vars<'a, I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (k, v) in vars {
            self.vars.insert(k.to_string(), v.to_string());
        }
        self
    }

    /// Join all fragments with blank lines and fill placeholders.
    /// Unknown placeholders are left untouched.
    pub fn build(self) -> String {
        substitute(&self.parts.join(SEPARATOR), &self.vars)
    }
}

fn substitute(template: &str, vars: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = &after[..end];
                match vars.get(key) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push_str("{{");
                        out.push_str(key);
                        out.push_str("}}");
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

// ── Pipeline prompts ──────────────────────────────────────────────────────────

/// Wrap a raw request in the expert-web-developer preamble plus whatever
/// context the caller supplied.
pub fn build_enhanced_prompt(prompt: &str, context: &GenerationContext) -> String {
    let mut lines = Vec::new();
    if let Some(v) = &context.business_type {
        lines.push(format!("Business Type: {v}"));
    }
    if let Some(v) = &context.target_audience {
        lines.push(format!("Target Audience: {v}"));
    }
    if let Some(v) = &context.color_scheme {
        lines.push(format!("Color Scheme: {v}"));
    }
    if !context.features.is_empty() {
        lines.push(format!("Required Features: {}", context.features.join(", ")));
    }

    PromptBuilder::new()
        .append(ENHANCED)
        .append(lines.join("\n"))
        .append(ENHANCED_FOOTER)
        .var("prompt", prompt)
        .build()
}

pub fn business_analysis_prompt(description: &str) -> String {
    PromptBuilder::new()
        .append(BUSINESS_ANALYSIS)
        .var("description", description)
        .build()
}

pub fn design_specs_prompt(analysis: &BusinessAnalysis) -> String {
    PromptBuilder::new()
        .append(DESIGN_SPECS)
        .var("business_analysis", analysis.to_pretty_json())
        .build()
}

pub fn website_code_prompt(analysis: &BusinessAnalysis, design: &DesignSpecs) -> String {
    PromptBuilder::new()
        .append(WEBSITE_CODE)
        .var("business_analysis", analysis.to_pretty_json())
        .var("design_specs", design.to_pretty_json())
        .build()
}

pub fn direct_website_prompt(description: &str) -> String {
    PromptBuilder::new()
        .append(DIRECT_WEBSITE)
        .var("description", description)
        .build()
}

pub fn content_prompt(request: &ContentRequest) -> String {
    PromptBuilder::new()
        .append(CONTENT)
        .var("section", request.section.as_str())
        .var("section_purpose", request.section.purpose())
        .var("business_type", request.business_type.trim())
        .var("tone", request.tone.as_str())
        .var("length_hint", request.length.hint())
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_joins_with_blank_line() {
        let result = PromptBuilder::new().append("a").append("  ").append("b").build();
        assert_eq!(result, "a\n\nb");
    }

    #[test]
    fn builder_substitutes_variable() {
        let result = PromptBuilder::new()
            .append("Items: {{items}}")
            .var("items", "item1\nitem2")
            .build();
        assert_eq!(result, "Items: item1\nitem2");
    }

    #[test]
    fn unknown_placeholder_left_alone() {
        let result = PromptBuilder::new().append("x {{missing}} y").build();
        assert_eq!(result, "x {{missing}} y");
    }

    #[test]
    fn substituted_text_not_rescanned() {
        let result = PromptBuilder::new()
            .append("{{a}} {{b}}")
            .with_vars([("a", "{{b}}"), ("b", "B")])
            .build();
        assert_eq!(result, "{{b}} B");
    }

    #[test]
    fn unterminated_placeholder_kept_verbatim() {
        let result = PromptBuilder::new().append("open {{ never closed").build();
        assert_eq!(result, "open {{ never closed");
    }

    #[test]
    fn enhanced_prompt_includes_context_lines() {
        let ctx = GenerationContext {
            business_type: Some("Bakery".into()),
            target_audience: Some("Locals".into()),
            color_scheme: None,
            features: vec!["Menu".into(), "Online orders".into()],
        };
        let p = build_enhanced_prompt("A bakery site", &ctx);
        assert!(p.starts_with("You are an expert web developer and designer."));
        assert!(p.contains("User Request: A bakery site"));
        assert!(p.contains("Business Type: Bakery\nTarget Audience: Locals\nRequired Features: Menu, Online orders"));
        assert!(!p.contains("Color Scheme:"));
        assert!(p.ends_with("Return only the complete HTML code with embedded CSS and JavaScript."));
    }

    #[test]
    fn enhanced_prompt_without_context() {
        let p = build_enhanced_prompt("plain", &GenerationContext::default());
        assert!(p.contains("User Request: plain\n\nGenerate a complete, production-ready website."));
    }

    #[test]
    fn business_prompt_embeds_description_and_schema() {
        let p = business_analysis_prompt("Dog grooming in Leeds");
        assert!(p.contains("Business Description: Dog grooming in Leeds"));
        assert!(p.contains("\"competitiveAdvantages\": [\"string\"]"));
        assert!(!p.contains("{{"));
    }

    #[test]
    fn direct_prompt_quotes_description() {
        let p = direct_website_prompt("A yoga studio");
        assert!(p.contains("based on this description: \"A yoga studio\""));
        assert!(p.contains("https://cdn.tailwindcss.com"));
    }
}
