//! Structured-response extraction.
//!
//! Language models are asked for JSON but routinely wrap it in markdown
//! fences, surround it with prose, or return something else entirely. This
//! module recovers a JSON object from such text and checks it against a set
//! of required fields. It only classifies failures; substituting fallback
//! records is the caller's job.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

/// Why a model response could not be turned into a structured record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// No JSON object could be recovered from the text
    #[error("Failed to parse JSON response: {reason}")]
    Parse { reason: String },

    /// The object is missing required fields
    #[error("Missing required fields: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    /// All fields are present but at least one has the wrong type or value
    #[error("Invalid field value: {reason}")]
    InvalidField { reason: String },
}

/// Recover a JSON object from free-form model output.
///
/// Returns the parsed mapping unchanged once every name in `required` is
/// present.
pub fn extract(text: &str, required: &[&str]) -> Result<Map<String, Value>, ExtractError> {
    let body = strip_code_fence(text.trim());

    let map = match parse_object(body) {
        Ok(map) => map,
        Err(reason) => match outer_braces(body) {
            Some(candidate) => {
                parse_object(candidate).map_err(|reason| ExtractError::Parse { reason })?
            }
            None => return Err(ExtractError::Parse { reason }),
        },
    };

    let missing: Vec<String> = required
        .iter()
        .filter(|field| !map.contains_key(**field))
        .map(|field| field.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(ExtractError::Schema { missing });
    }

    Ok(map)
}

/// [`extract`] followed by deserialization into `T`
pub fn extract_as<T: DeserializeOwned>(text: &str, required: &[&str]) -> Result<T, ExtractError> {
    let map = extract(text, required)?;
    serde_json::from_value(Value::Object(map)).map_err(|e| ExtractError::InvalidField {
        reason: e.to_string(),
    })
}

/// Strip a surrounding markdown code fence, with or without a language tag.
///
/// Input must already be trimmed. Text that does not open with a fence is
/// returned as-is; an unterminated fence keeps everything after the opener.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };

    let body = match rest.split_once('\n') {
        Some((tag, body)) if is_language_tag(tag) => body,
        // Single-line fence such as ```json {"a": 1}```
        _ => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };

    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

fn is_language_tag(line: &str) -> bool {
    line.trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+'))
}

fn parse_object(text: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("expected a JSON object, found {}", json_type(&other))),
        Err(e) => Err(e.to_string()),
    }
}

/// Slice from the first `{` to the last `}`, if they appear in that order
fn outer_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
