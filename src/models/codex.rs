use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::search::Role;

/// Which record kind a Codex message was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageSource {
    ResponseItem,
    EventMsg,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodexMessage {
    pub id: String,
    pub text: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub source: MessageSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reasoning {
    pub id: String,
    pub summary: Option<String>,
    pub text: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    /// Only encrypted content was delivered, no plaintext is available
    pub encrypted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Option<String>,
    pub call_id: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub id: String,
    pub call_id: Option<String>,
    pub output: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemEvent {
    pub id: String,
    pub subtype: String,
    pub text: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MetaEvent {
    TokenCount { timestamp: Option<DateTime<Utc>>, info: Value },
    TurnContext { timestamp: Option<DateTime<Utc>>, context: Value },
}

/// Flat, normalized view of a Codex log in original order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum CodexEntry {
    User(CodexMessage),
    Assistant(CodexMessage),
    AssistantReasoning(Reasoning),
    ToolCall(ToolCall),
    ToolResult(ToolResult),
    System(SystemEvent),
}

impl CodexEntry {
    pub fn id(&self) -> &str {
        match self {
            CodexEntry::User(m) | CodexEntry::Assistant(m) => &m.id,
            CodexEntry::AssistantReasoning(r) => &r.id,
            CodexEntry::ToolCall(c) => &c.id,
            CodexEntry::ToolResult(r) => &r.id,
            CodexEntry::System(e) => &e.id,
        }
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            CodexEntry::User(m) | CodexEntry::Assistant(m) => m.timestamp,
            CodexEntry::AssistantReasoning(r) => r.timestamp,
            CodexEntry::ToolCall(c) => c.timestamp,
            CodexEntry::ToolResult(r) => r.timestamp,
            CodexEntry::System(e) => e.timestamp,
        }
    }

    /// Role for conversational messages; `None` for everything else
    pub fn role(&self) -> Option<Role> {
        match self {
            CodexEntry::User(_) => Some(Role::User),
            CodexEntry::Assistant(_) => Some(Role::Assistant),
            _ => None,
        }
    }
}

/// A tool call together with its result, if one was observed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolPair {
    pub call: ToolCall,
    pub result: Option<ToolResult>,
    /// The call is a placeholder for a result whose call never appeared
    pub orphan: bool,
}

pub const ORPHAN_TOOL_NAME: &str = "(unknown)";

/// One user-initiated exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub id: String,
    pub user_message: Option<CodexMessage>,
    pub assistant_messages: Vec<CodexMessage>,
    pub reasonings: Vec<Reasoning>,
    pub tool_calls: Vec<ToolCall>,
    pub tool_results: Vec<ToolResult>,
    pub meta_events: Vec<MetaEvent>,
}

impl Turn {
    pub fn new(id: String) -> Self {
        Self {
            id,
            user_message: None,
            assistant_messages: Vec::new(),
            reasonings: Vec::new(),
            tool_calls: Vec::new(),
            tool_results: Vec::new(),
            meta_events: Vec::new(),
        }
    }

    /// Pair every tool call with its result by call id.
    ///
    /// Calls keep their original order. Results that no call in this turn claims
    /// are appended afterwards, each paired with a synthetic placeholder call.
    pub fn tool_pairs(&self) -> Vec<ToolPair> {
        let mut claimed: HashSet<usize> = HashSet::new();

        let mut pairs: Vec<ToolPair> = self
            .tool_calls
            .iter()
            .map(|call| {
                let result = call.call_id.as_deref().and_then(|call_id| {
                    self.tool_results.iter().enumerate().find(|(idx, result)| {
                        !claimed.contains(idx) && result.call_id.as_deref() == Some(call_id)
                    })
                });
                let result = result.map(|(idx, result)| {
                    claimed.insert(idx);
                    result.clone()
                });
                ToolPair { call: call.clone(), result, orphan: false }
            })
            .collect();

        for (idx, result) in self.tool_results.iter().enumerate() {
            if claimed.contains(&idx) {
                continue;
            }
            pairs.push(ToolPair {
                call: ToolCall {
                    id: format!("{}-orphan", result.id),
                    name: ORPHAN_TOOL_NAME.to_string(),
                    arguments: None,
                    call_id: result.call_id.clone(),
                    timestamp: result.timestamp,
                },
                result: Some(result.clone()),
                orphan: true,
            });
        }

        pairs
    }
}

/// Fields of the `session_meta` header record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodexSessionMeta {
    pub session_uuid: Option<String>,
    pub cwd: Option<String>,
    pub instructions: Option<String>,
    pub originator: Option<String>,
    pub cli_version: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Everything reconstructed from one Codex log file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodexSession {
    pub entries: Vec<CodexEntry>,
    pub turns: Vec<Turn>,
    pub meta_events: Vec<MetaEvent>,
    pub session_meta: CodexSessionMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(id: &str, call_id: Option<&str>) -> ToolCall {
        ToolCall {
            id: id.to_string(),
            name: "shell".to_string(),
            arguments: Some("{}".to_string()),
            call_id: call_id.map(str::to_string),
            timestamp: None,
        }
    }

    fn result(id: &str, call_id: Option<&str>) -> ToolResult {
        ToolResult {
            id: id.to_string(),
            call_id: call_id.map(str::to_string),
            output: Some("ok".to_string()),
            timestamp: None,
        }
    }

    #[test]
    fn test_tool_pairs_matches_by_call_id() {
        let mut turn = Turn::new("turn-1".to_string());
        turn.tool_calls.push(call("tool-1", Some("a")));
        turn.tool_calls.push(call("tool-2", Some("b")));
        turn.tool_results.push(result("tool-result-3", Some("b")));

        let pairs = turn.tool_pairs();
        assert_eq!(pairs.len(), 2);
        assert!(pairs[0].result.is_none());
        assert_eq!(pairs[1].result.as_ref().unwrap().id, "tool-result-3");
        assert!(pairs.iter().all(|p| !p.orphan));
    }

    #[test]
    fn test_tool_pairs_keeps_orphan_results() {
        let mut turn = Turn::new("turn-1".to_string());
        turn.tool_results.push(result("tool-result-1", Some("missing")));

        let pairs = turn.tool_pairs();
        assert_eq!(pairs.len(), 1);
        assert!(pairs[0].orphan);
        assert_eq!(pairs[0].call.id, "tool-result-1-orphan");
        assert_eq!(pairs[0].call.name, ORPHAN_TOOL_NAME);
        assert_eq!(pairs[0].call.call_id.as_deref(), Some("missing"));
        assert!(pairs[0].call.arguments.is_none());
    }

    #[test]
    fn test_tool_pairs_result_without_call_id_is_orphan() {
        let mut turn = Turn::new("turn-1".to_string());
        turn.tool_calls.push(call("tool-1", None));
        turn.tool_results.push(result("tool-result-2", None));

        let pairs = turn.tool_pairs();
        assert_eq!(pairs.len(), 2);
        assert!(pairs[0].result.is_none());
        assert!(pairs[1].orphan);
    }

    #[test]
    fn test_codex_entry_serializes_with_kebab_tag() {
        let entry = CodexEntry::AssistantReasoning(Reasoning {
            id: "reasoning-1".to_string(),
            summary: Some("thinking".to_string()),
            text: None,
            timestamp: None,
            encrypted: true,
        });
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "assistant-reasoning");
        assert_eq!(json["encrypted"], true);
    }
}
