//! JSON extraction from LLM output.
//!
//! Models asked for "ONLY the JSON object" still wrap it in markdown fences
//! or add a sentence before or after. [`extract_json_from_markdown`] strips
//! the fences, cuts out the first balanced `{...}` object and parses it. When
//! that fails, the shortest `{...}` span of the raw content gets one more try
//! before the first error is returned. A reply cut off mid-object is an error,
//! never a nested fragment of it.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    #[error("no JSON object found in response")]
    NoJsonObject,
    #[error("unmatched braces in JSON")]
    UnmatchedBraces,
    #[error("failed to parse JSON response: {0}")]
    InvalidJson(String),
}

static SHORTEST_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[\s\S]*?\}").expect("static regex is valid"));

/// Extract and parse the first JSON object in `content`.
pub fn extract_json_from_markdown(content: &str) -> Result<Value, ExtractError> {
    debug!(preview = %preview(content), "extracting JSON from model output");

    let body = strip_json_fences(content);
    let primary = match body.find('{') {
        Some(first) => match parse_object_at(body, first) {
            Ok(value) => return Ok(value),
            Err(e) => e,
        },
        None => ExtractError::NoJsonObject,
    };
    warn!(error = %primary, "balanced JSON candidate rejected, retrying shortest span");

    SHORTEST_OBJECT
        .find(content)
        .and_then(|m| serde_json::from_str(m.as_str()).ok())
        .ok_or(primary)
}

fn parse_object_at(body: &str, start: usize) -> Result<Value, ExtractError> {
    let end = matching_brace(body, start).ok_or(ExtractError::UnmatchedBraces)?;
    let slice = &body[start..=end];
    debug!(preview = %preview(slice), "extracted JSON candidate");
    serde_json::from_str(slice).map_err(|e| ExtractError::InvalidJson(e.to_string()))
}

/// Remove a leading ```` ```json ```` / ```` ``` ```` fence and a trailing ```` ``` ````.
fn strip_json_fences(content: &str) -> &str {
    let mut s = content.trim();
    if let Some(rest) = s.strip_prefix("```json") {
        s = rest.trim_start();
    }
    if let Some(rest) = s.strip_prefix("```") {
        s = rest.trim_start();
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest.trim_end();
    }
    s
}

/// Byte index of the `}` closing the object that opens at `start`.
/// Braces inside JSON string literals are ignored.
fn matching_brace(s: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in s[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(start + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Trim a surrounding markdown code fence (```` ```html ````, ```` ``` ````)
/// from generated HTML. Text without fences is returned trimmed.
pub fn strip_code_fences(content: &str) -> String {
    let mut s = content.trim();
    if s.starts_with("```") {
        s = match s.find('\n') {
            Some(nl) => &s[nl + 1..],
            None => "",
        };
    }
    if let Some(rest) = s.trim_end().strip_suffix("```") {
        s = rest;
    }
    s.trim().to_string()
}

fn preview(s: &str) -> String {
    s.chars().take(200).collect()
}
