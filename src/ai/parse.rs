//! Tolerant parsing of model output.

use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{AiError, SuggestionResponse};
use crate::invoice::Suggestion;

/// Code fence markers, language-tagged first.
static FENCE_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)```json|```|'''json|'''").expect("fence pattern is valid")
});

/// Remove Markdown-style code fence markers (case-insensitive) and trim.
#[must_use]
pub fn strip_code_fences(text: &str) -> String {
    FENCE_MARKERS.replace_all(text, "").trim().to_string()
}

/// Find the first balanced `{...}` object, ignoring braces inside strings.
fn first_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Extract a JSON object from AI response text.
///
/// Strips code fences, then parses the first balanced object.
///
/// # Errors
///
/// Returns `AiError::ParseError` if the text is empty, contains no balanced
/// object, or the object does not deserialize into `T`.
pub fn extract_json<T: DeserializeOwned>(text: &str) -> Result<T, AiError> {
    if text.trim().is_empty() {
        return Err(AiError::ParseError("AI response is empty".to_string()));
    }

    let cleaned = strip_code_fences(text);
    let json_str = first_balanced_object(&cleaned).ok_or_else(|| {
        AiError::ParseError(format!("No JSON object found in response: {text}"))
    })?;

    serde_json::from_str(json_str)
        .map_err(|e| AiError::ParseError(format!("Failed to parse JSON: {e}")))
}

/// Parse a suggestion response from model output.
///
/// A malformed entry is dropped on its own; the rest of the response is kept.
///
/// # Errors
///
/// Returns `AiError::ParseError` if no valid response object is found.
pub fn parse_suggestions(text: &str) -> Result<SuggestionResponse, AiError> {
    let raw: RawResponse = extract_json(text)?;
    let suggestions = raw
        .suggestions
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<Suggestion>(value) {
            Ok(suggestion) => Some(suggestion),
            Err(e) => {
                tracing::warn!(error = %e, "Dropping malformed suggestion");
                None
            }
        })
        .collect();

    Ok(SuggestionResponse {
        suggestions,
        reasoning: raw.reasoning,
    })
}

/// Response shape before each suggestion is checked on its own.
#[derive(Deserialize)]
struct RawResponse {
    #[serde(default)]
    suggestions: Vec<serde_json::Value>,
    #[serde(default)]
    reasoning: String,
}
