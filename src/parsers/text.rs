//! Text extraction helpers for Codex payloads

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static USER_INSTRUCTIONS_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<user_instructions>.*?</user_instructions>").expect("valid regex")
});
static ENVIRONMENT_CONTEXT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<environment_context>.*?</environment_context>").expect("valid regex")
});
static USER_INSTRUCTIONS_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?.*?user_instructions>").expect("valid regex"));
static ENVIRONMENT_CONTEXT_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?.*?environment_context>").expect("valid regex"));

/// Strip injected instruction and environment blocks, plus any stray tags
pub fn filter_instruction_tags(text: &str) -> String {
    let text = USER_INSTRUCTIONS_BLOCK.replace_all(text, "");
    let text = ENVIRONMENT_CONTEXT_BLOCK.replace_all(&text, "");
    let text = USER_INSTRUCTIONS_TAG.replace_all(&text, "");
    let text = ENVIRONMENT_CONTEXT_TAG.replace_all(&text, "");
    text.trim().to_string()
}

/// Text of a message `content` field: a string, or an array whose string items
/// and `text` fields are filtered and joined by blank lines
pub fn extract_text_from_content(content: Option<&Value>) -> String {
    match content {
        Some(Value::String(text)) => filter_instruction_tags(text),
        Some(Value::Array(items)) => {
            let texts: Vec<String> = items
                .iter()
                .filter_map(|item| match item {
                    Value::String(text) => Some(filter_instruction_tags(text)),
                    Value::Object(map) => {
                        map.get("text").and_then(Value::as_str).map(filter_instruction_tags)
                    }
                    _ => None,
                })
                .collect();
            texts.join("\n\n").trim().to_string()
        }
        _ => String::new(),
    }
}

/// Summary text of a reasoning payload, `None` when nothing readable is present
pub fn extract_summary_text(summary: Option<&Value>) -> Option<String> {
    let items = summary.and_then(Value::as_array)?;
    let parts: Vec<&str> = items
        .iter()
        .filter_map(|item| match item {
            Value::String(text) => Some(text.as_str()),
            Value::Object(map) => map.get("text").and_then(Value::as_str),
            _ => None,
        })
        .collect();
    let joined = parts.join("\n\n");
    if joined.is_empty() { None } else { Some(joined) }
}

/// `text` field of an event payload, falling back to `message`
pub fn event_text(payload: &Value) -> Option<&str> {
    payload.get("text").and_then(Value::as_str).or_else(|| payload.get("message").and_then(Value::as_str))
}

/// A string field kept verbatim, any other JSON value re-serialized
pub fn string_or_json(value: Option<&Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}
