//! Pull a JSON object out of free-form completion text.

use super::model::ProjectBundle;
use crate::error::{ForgeError, ForgeResult};

/// Remove a wrapping Markdown fence (```` ```json ```` or bare ```` ``` ````).
pub fn strip_code_fence(text: &str) -> &str {
    let mut cleaned = text.trim();
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest;
    } else if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest;
    }
    cleaned.trim()
}

/// First balanced top-level `{...}` span. Braces inside string literals
/// (including escaped quotes) do not count toward nesting.
pub fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + ch.len_utf8();
                    return Some(&text[start..end]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Fence-strip, scan, and decode a project bundle.
pub fn parse_bundle(text: &str) -> ForgeResult<ProjectBundle> {
    let cleaned = strip_code_fence(text);
    let span = first_json_object(cleaned)
        .ok_or_else(|| ForgeError::Parse("No JSON object found in the response".into()))?;

    serde_json::from_str::<ProjectBundle>(span)
        .map_err(|e| ForgeError::Parse(format!("invalid project JSON: {}", e)))
}
