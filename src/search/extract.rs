//! Which parts of a session are searchable

use std::borrow::Cow;

use chrono::{DateTime, Utc};

use crate::models::{ClaudeEntry, CodexSession, Role};

/// One candidate text for substring matching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchableText<'a> {
    pub role: Role,
    pub text: Cow<'a, str>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Codex candidates in turn order: each turn's user message, then its
/// assistant messages. Reasoning and tool traffic are never searched.
pub fn codex_texts(session: &CodexSession) -> Vec<SearchableText<'_>> {
    let mut texts = Vec::new();
    for turn in &session.turns {
        if let Some(user) = turn.user_message.as_ref().filter(|m| !m.text.is_empty()) {
            texts.push(SearchableText {
                role: Role::User,
                text: Cow::Borrowed(&user.text),
                timestamp: user.timestamp,
            });
        }
        texts.extend(turn.assistant_messages.iter().map(|message| SearchableText {
            role: Role::Assistant,
            text: Cow::Borrowed(&message.text),
            timestamp: message.timestamp,
        }));
    }
    texts
}

/// Claude Code candidate of one entry.
///
/// User entries contribute the same preview text used for session summaries;
/// assistant entries only their text blocks. Thinking, tool use and tool
/// results are never searched.
pub fn claude_text(entry: &ClaudeEntry) -> Option<SearchableText<'static>> {
    let (role, text) = match entry {
        ClaudeEntry::User(user) => (Role::User, user.message.content.first_text()?),
        ClaudeEntry::Assistant(assistant) => (Role::Assistant, assistant.message.text()),
        _ => return None,
    };
    if text.is_empty() {
        return None;
    }
    Some(SearchableText { role, text: Cow::Owned(text), timestamp: entry.timestamp() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::{parse_claude_session, parse_codex_session};

    #[test]
    fn test_codex_texts_order_and_exclusions() {
        let content = r#"{"type":"response_item","payload":{"type":"message","role":"user","content":"first"}}
{"type":"response_item","payload":{"type":"reasoning","summary":[{"type":"summary_text","text":"secret plan"}]}}
{"type":"response_item","payload":{"type":"function_call","name":"shell","arguments":"ls","call_id":"c1"}}
{"type":"response_item","payload":{"type":"message","role":"assistant","content":"reply"}}
{"type":"response_item","payload":{"type":"message","role":"user","content":"second"}}"#;
        let session = parse_codex_session(content);
        let texts = codex_texts(&session);
        let summary: Vec<(Role, &str)> = texts.iter().map(|t| (t.role, t.text.as_ref())).collect();
        assert_eq!(summary, vec![(Role::User, "first"), (Role::Assistant, "reply"), (Role::User, "second")]);
    }

    #[test]
    fn test_claude_text_rules() {
        let base = r#""isSidechain":false,"userType":"external","cwd":"/w","sessionId":"s","version":"2","uuid":"550e8400-e29b-41d4-a716-446655440001","timestamp":"2025-01-01T00:00:00Z","parentUuid":null"#;
        let content = [
            format!(r#"{{{},"type":"user","message":{{"role":"user","content":[{{"type":"tool_result","tool_use_id":"t","content":"tool output"}}]}}}}"#, base),
            format!(r#"{{{},"type":"user","message":{{"role":"user","content":"question"}}}}"#, base),
            format!(
                r#"{{{},"type":"assistant","message":{{"id":"m","type":"message","role":"assistant","model":"x","content":[{{"type":"thinking","thinking":"hidden"}},{{"type":"text","text":"a"}},{{"type":"tool_use","id":"t","name":"Bash","input":{{}}}},{{"type":"text","text":"b"}}],"stop_reason":null,"stop_sequence":null,"usage":{{"input_tokens":1,"output_tokens":1}}}}}}"#,
                base
            ),
        ]
        .join("\n");
        let entries = parse_claude_session(&content);

        assert!(claude_text(&entries[0]).is_none());
        let user = claude_text(&entries[1]).unwrap();
        assert_eq!((user.role, user.text.as_ref()), (Role::User, "question"));
        assert!(user.timestamp.is_some());
        let assistant = claude_text(&entries[2]).unwrap();
        assert_eq!((assistant.role, assistant.text.as_ref()), (Role::Assistant, "a\nb"));
    }
}
