//! Derived per-session summaries
//!
//! Pure functions of parsed entries plus the file timestamps handed in by the
//! caller.

use chrono::{DateTime, Utc};

use crate::models::{
    ClaudeEntry, ClaudeSessionSummary, CodexSession, CodexSessionSummary, ParsedCommand,
    SessionCost, TokenUsage,
};

// Approximate Sonnet pricing in USD per token
const INPUT_USD_PER_TOKEN: f64 = 3.0 / 1_000_000.0;
const OUTPUT_USD_PER_TOKEN: f64 = 15.0 / 1_000_000.0;
const CACHE_USD_PER_TOKEN: f64 = 3.75 / 1_000_000.0;

/// Modification and creation time of a session file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileTimes {
    pub modified: Option<DateTime<Utc>>,
    pub created: Option<DateTime<Utc>>,
}

impl FileTimes {
    pub fn from_metadata(metadata: &std::fs::Metadata) -> Self {
        Self {
            modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            created: metadata.created().ok().map(DateTime::<Utc>::from),
        }
    }
}

/// Summary of a parsed Codex session
pub fn codex_session_summary(session: &CodexSession, times: FileTimes) -> CodexSessionSummary {
    let first_command = session
        .turns
        .iter()
        .filter_map(|turn| turn.user_message.as_ref())
        .find(|message| !message.text.trim().is_empty())
        .map(|message| ParsedCommand::Text { content: message.text.clone() });

    CodexSessionSummary {
        message_count: session.entries.len(),
        first_command,
        last_modified_at: times.modified,
        started_at: times.created,
    }
}

/// Preview of the first user entry's text
pub fn first_user_text(entries: &[ClaudeEntry]) -> Option<String> {
    entries.iter().find_map(|entry| match entry {
        ClaudeEntry::User(user) => Some(user),
        _ => None,
    })?
    .message
    .content
    .first_text()
}

/// Token totals, approximate cost and model of a Claude Code session.
/// The model is the one named by the first assistant entry.
pub fn calculate_session_cost(entries: &[ClaudeEntry]) -> (SessionCost, Option<String>) {
    let mut usage = TokenUsage::default();
    let mut model_name: Option<String> = None;

    for entry in entries {
        let ClaudeEntry::Assistant(assistant) = entry else {
            continue;
        };
        let counters = &assistant.message.usage;
        usage.input_tokens += counters.input_tokens;
        usage.output_tokens += counters.output_tokens;
        usage.cache_creation_tokens += counters.cache_creation_input_tokens.unwrap_or(0);
        usage.cache_read_tokens += counters.cache_read_input_tokens.unwrap_or(0);
        if model_name.is_none() {
            model_name = Some(assistant.message.model.clone());
        }
    }

    let total_usd = usage.input_tokens as f64 * INPUT_USD_PER_TOKEN
        + usage.output_tokens as f64 * OUTPUT_USD_PER_TOKEN
        + (usage.cache_creation_tokens + usage.cache_read_tokens) as f64 * CACHE_USD_PER_TOKEN;

    (SessionCost { total_usd, token_usage: usage }, model_name)
}

/// Summary of a validated Claude Code session
pub fn claude_session_summary(entries: &[ClaudeEntry]) -> ClaudeSessionSummary {
    let (cost, model_name) = calculate_session_cost(entries);
    ClaudeSessionSummary {
        message_count: entries.iter().filter(|entry| entry.is_message()).count(),
        first_user_message: first_user_text(entries),
        model_name,
        cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::{parse_claude_session, parse_codex_session};

    const BASE: &str = r#""isSidechain":false,"userType":"external","cwd":"/w","sessionId":"s","version":"2.0.0","uuid":"550e8400-e29b-41d4-a716-446655440001","timestamp":"2025-01-01T00:00:00Z","parentUuid":null"#;

    fn assistant(model: &str, input: u64, output: u64, cache_create: u64, cache_read: u64) -> String {
        format!(
            r#"{{{},"type":"assistant","message":{{"id":"m","type":"message","role":"assistant","model":"{}","content":[{{"type":"text","text":"ok"}}],"stop_reason":null,"stop_sequence":null,"usage":{{"input_tokens":{},"output_tokens":{},"cache_creation_input_tokens":{},"cache_read_input_tokens":{}}}}}}}"#,
            BASE, model, input, output, cache_create, cache_read
        )
    }

    fn user(content: &str) -> String {
        format!(r#"{{{},"type":"user","message":{{"role":"user","content":{}}}}}"#, BASE, content)
    }

    #[test]
    fn test_cost_rates() {
        let content = [
            assistant("claude-sonnet-4-5", 1_000_000, 0, 0, 0),
            assistant("claude-opus-4", 0, 1_000_000, 500_000, 500_000),
        ]
        .join("\n");
        let entries = parse_claude_session(&content);
        let (cost, model) = calculate_session_cost(&entries);

        assert_eq!(model.as_deref(), Some("claude-sonnet-4-5"));
        assert_eq!(cost.token_usage.input_tokens, 1_000_000);
        assert_eq!(cost.token_usage.cache_creation_tokens, 500_000);
        assert!((cost.total_usd - (3.0 + 15.0 + 3.75)).abs() < 1e-9);
    }

    #[test]
    fn test_claude_summary() {
        let content = [
            r#"{"type":"summary","summary":"x","leafUuid":"550e8400-e29b-41d4-a716-446655440009"}"#.to_string(),
            user(r#"[{"type":"tool_result","tool_use_id":"t","content":"out"},{"type":"text","text":"Fix the build"}]"#),
            assistant("claude-sonnet-4-5", 10, 20, 0, 0),
            "broken line".to_string(),
        ]
        .join("\n");
        let summary = claude_session_summary(&parse_claude_session(&content));

        assert_eq!(summary.message_count, 2);
        assert_eq!(summary.first_user_message.as_deref(), Some("Fix the build"));
        assert_eq!(summary.model_name.as_deref(), Some("claude-sonnet-4-5"));
    }

    #[test]
    fn test_claude_summary_of_empty_session() {
        let summary = claude_session_summary(&[]);
        assert_eq!(summary, ClaudeSessionSummary::default());
    }

    #[test]
    fn test_codex_summary() {
        let content = r#"{"type":"response_item","payload":{"type":"message","role":"assistant","content":"warming up"}}
{"type":"response_item","payload":{"type":"message","role":"user","content":"Add a flag"}}"#;
        let session = parse_codex_session(content);
        let times = FileTimes { modified: DateTime::from_timestamp(10, 0), created: DateTime::from_timestamp(5, 0) };
        let summary = codex_session_summary(&session, times);

        assert_eq!(summary.message_count, 2);
        assert_eq!(summary.first_command, Some(ParsedCommand::Text { content: "Add a flag".to_string() }));
        assert_eq!(summary.last_modified_at, times.modified);
        assert_eq!(summary.started_at, times.created);
    }
}
