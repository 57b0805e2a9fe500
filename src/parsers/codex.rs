//! Codex rollout log parser
//!
//! Reconstructs a flat entry list and a turn-structured view from the
//! line-delimited records Codex writes under `~/.codex/sessions/`.
//!
//! The pass is a single fold over non-empty lines. Each line is classified into
//! a closed [`CodexRecord`] and applied to a [`SessionAccumulator`], which owns
//! the turn arena, the current-turn cursor, the call-id routing map, and the
//! per-role dedup state. Lines that are not JSON are logged and skipped.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use super::deserializers::{parse_timestamp, timestamp_from_value};
use super::text::{
    event_text, extract_summary_text, extract_text_from_content, filter_instruction_tags,
    string_or_json,
};
use crate::models::{
    CodexEntry, CodexMessage, CodexSession, CodexSessionMeta, MessageSource, MetaEvent, Reasoning,
    Role, SystemEvent, ToolCall, ToolResult, Turn,
};

const UNKNOWN_TOOL_NAME: &str = "unknown";

// ============================================
// Record classification
// ============================================

/// Fields of a `session_meta` payload that are present as strings
#[derive(Debug, Default)]
struct SessionMetaFields {
    id: Option<String>,
    cwd: Option<String>,
    instructions: Option<String>,
    originator: Option<String>,
    cli_version: Option<String>,
    timestamp: Option<String>,
}

#[derive(Debug)]
enum ResponseItem {
    Message { role: Role, content: Option<Value> },
    Reasoning { summary: Option<String>, encrypted: bool },
    FunctionCall { name: String, arguments: Option<String>, call_id: Option<String> },
    FunctionCallOutput { call_id: Option<String>, output: Option<String> },
    Other(Option<String>),
}

#[derive(Debug)]
enum EventMsg {
    AgentReasoning(Option<String>),
    Message { role: Role, text: Option<String> },
    TokenCount(Value),
    Other { kind: String, text: Option<String> },
    Untyped,
}

/// One classified log line
#[derive(Debug)]
enum CodexRecord {
    SessionMeta(SessionMetaFields),
    TurnContext(Value),
    ResponseItem(ResponseItem),
    EventMsg(EventMsg),
    /// A payload that is missing or not an object
    MissingPayload,
    Unknown(Option<String>),
}

fn str_field(payload: &Value, key: &str) -> Option<String> {
    payload.get(key).and_then(Value::as_str).map(str::to_string)
}

fn classify(line: &Value) -> CodexRecord {
    let kind = line.get("type").and_then(Value::as_str);
    let payload = line.get("payload");

    match kind {
        Some("turn_context") => CodexRecord::TurnContext(payload.cloned().unwrap_or(Value::Null)),
        Some(tag @ ("session_meta" | "response_item" | "event_msg")) => {
            let Some(payload) = payload.filter(|p| p.is_object()) else {
                return CodexRecord::MissingPayload;
            };
            match tag {
                "session_meta" => CodexRecord::SessionMeta(SessionMetaFields {
                    id: str_field(payload, "id"),
                    cwd: str_field(payload, "cwd"),
                    instructions: str_field(payload, "instructions"),
                    originator: str_field(payload, "originator"),
                    cli_version: str_field(payload, "cli_version"),
                    timestamp: str_field(payload, "timestamp"),
                }),
                "response_item" => CodexRecord::ResponseItem(classify_response_item(payload)),
                _ => CodexRecord::EventMsg(classify_event_msg(payload)),
            }
        }
        other => CodexRecord::Unknown(other.map(str::to_string)),
    }
}

fn classify_response_item(payload: &Value) -> ResponseItem {
    match payload.get("type").and_then(Value::as_str) {
        Some("message") => {
            let role = match payload.get("role").and_then(Value::as_str) {
                Some("assistant") => Role::Assistant,
                _ => Role::User,
            };
            ResponseItem::Message { role, content: payload.get("content").cloned() }
        }
        Some("reasoning") => ResponseItem::Reasoning {
            summary: extract_summary_text(payload.get("summary")),
            encrypted: payload.get("encrypted_content").is_some_and(Value::is_string),
        },
        Some("function_call") => ResponseItem::FunctionCall {
            name: str_field(payload, "name").unwrap_or_else(|| UNKNOWN_TOOL_NAME.to_string()),
            arguments: string_or_json(payload.get("arguments")),
            call_id: str_field(payload, "call_id"),
        },
        Some("function_call_output") => ResponseItem::FunctionCallOutput {
            call_id: str_field(payload, "call_id"),
            output: string_or_json(payload.get("output")),
        },
        other => ResponseItem::Other(other.map(str::to_string)),
    }
}

fn classify_event_msg(payload: &Value) -> EventMsg {
    let text = event_text(payload).map(str::to_string);
    match payload.get("type").and_then(Value::as_str) {
        Some("agent_reasoning") => EventMsg::AgentReasoning(text),
        Some("agent_message") => EventMsg::Message { role: Role::Assistant, text },
        Some("user_message") => EventMsg::Message { role: Role::User, text },
        Some("token_count") => EventMsg::TokenCount(payload.get("info").cloned().unwrap_or(Value::Null)),
        Some(kind) => EventMsg::Other { kind: kind.to_string(), text },
        None => EventMsg::Untyped,
    }
}

// ============================================
// Accumulator
// ============================================

/// Last text seen per role across the whole session
#[derive(Debug, Default)]
struct LastSeen {
    user: Option<String>,
    assistant: Option<String>,
}

impl LastSeen {
    fn get(&self, role: Role) -> Option<&str> {
        match role {
            Role::User => self.user.as_deref(),
            Role::Assistant => self.assistant.as_deref(),
        }
    }

    fn set(&mut self, role: Role, text: &str) {
        let slot = match role {
            Role::User => &mut self.user,
            Role::Assistant => &mut self.assistant,
        };
        *slot = Some(text.to_string());
    }
}

#[derive(Debug, Default)]
struct SessionAccumulator {
    entries: Vec<CodexEntry>,
    turns: Vec<Turn>,
    meta_events: Vec<MetaEvent>,
    session_meta: CodexSessionMeta,
    /// Index of the turn new content attaches to
    cursor: Option<usize>,
    /// Turn that issued each tool call
    call_turns: HashMap<String, usize>,
    last_seen: LastSeen,
    next_entry_id: usize,
}

impl SessionAccumulator {
    fn entry_id(&mut self, prefix: &str) -> String {
        self.next_entry_id += 1;
        format!("{}-{}", prefix, self.next_entry_id)
    }

    fn start_turn(&mut self) -> usize {
        let id = format!("turn-{}", self.turns.len() + 1);
        self.turns.push(Turn::new(id));
        let idx = self.turns.len() - 1;
        self.cursor = Some(idx);
        idx
    }

    /// Current turn, created on first use
    fn current_turn(&mut self) -> usize {
        match self.cursor {
            Some(idx) => idx,
            None => self.start_turn(),
        }
    }

    fn current_has_user_message(&self) -> bool {
        self.cursor.is_some_and(|idx| self.turns[idx].user_message.is_some())
    }

    fn attach_user_message(&mut self, message: CodexMessage) {
        let idx = match self.cursor {
            Some(idx) if self.turns[idx].user_message.is_none() => idx,
            _ => self.start_turn(),
        };
        self.turns[idx].user_message = Some(message);
    }

    fn push_message(&mut self, role: Role, text: String, timestamp: Option<DateTime<Utc>>, source: MessageSource) -> CodexMessage {
        let prefix = match role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        let message = CodexMessage { id: self.entry_id(prefix), text, timestamp, source };
        self.entries.push(match role {
            Role::User => CodexEntry::User(message.clone()),
            Role::Assistant => CodexEntry::Assistant(message.clone()),
        });
        message
    }

    fn push_meta_event(&mut self, event: MetaEvent) {
        self.meta_events.push(event.clone());
        // Meta events never open a turn of their own
        if let Some(idx) = self.cursor {
            self.turns[idx].meta_events.push(event);
        }
    }

    fn push_reasoning(&mut self, reasoning: Reasoning) {
        self.entries.push(CodexEntry::AssistantReasoning(reasoning.clone()));
        let idx = self.current_turn();
        self.turns[idx].reasonings.push(reasoning);
    }

    fn apply(&mut self, record: CodexRecord, timestamp: Option<DateTime<Utc>>) {
        match record {
            CodexRecord::SessionMeta(fields) => self.apply_session_meta(fields, timestamp),
            CodexRecord::TurnContext(context) => {
                self.push_meta_event(MetaEvent::TurnContext { timestamp, context });
            }
            CodexRecord::ResponseItem(item) => self.apply_response_item(item, timestamp),
            CodexRecord::EventMsg(event) => self.apply_event_msg(event, timestamp),
            CodexRecord::MissingPayload => debug!("Skipping Codex record without payload"),
            CodexRecord::Unknown(kind) => debug!(?kind, "Skipping unknown Codex record type"),
        }
    }

    fn apply_session_meta(&mut self, fields: SessionMetaFields, line_timestamp: Option<DateTime<Utc>>) {
        let meta = &mut self.session_meta;
        if fields.id.is_some() {
            meta.session_uuid = fields.id;
        }
        if fields.cwd.is_some() {
            meta.cwd = fields.cwd;
        }
        if fields.instructions.is_some() {
            meta.instructions = fields.instructions;
        }
        if fields.originator.is_some() {
            meta.originator = fields.originator;
        }
        if fields.cli_version.is_some() {
            meta.cli_version = fields.cli_version;
        }
        meta.timestamp = match fields.timestamp {
            Some(raw) => parse_timestamp(&raw),
            None => line_timestamp,
        };
    }

    fn apply_response_item(&mut self, item: ResponseItem, timestamp: Option<DateTime<Utc>>) {
        match item {
            ResponseItem::Message { role, content } => {
                let text = extract_text_from_content(content.as_ref());
                let normalized = text.trim();

                if normalized.is_empty() {
                    // An empty user message still marks a turn boundary
                    if role == Role::User && self.current_has_user_message() {
                        self.start_turn();
                    }
                    return;
                }
                if self.last_seen.get(role) == Some(normalized) {
                    return;
                }

                let message = self.push_message(role, normalized.to_string(), timestamp, MessageSource::ResponseItem);
                match role {
                    Role::User => self.attach_user_message(message),
                    Role::Assistant => {
                        let idx = self.current_turn();
                        self.turns[idx].assistant_messages.push(message);
                    }
                }
                self.last_seen.set(role, normalized);
            }
            ResponseItem::Reasoning { summary, encrypted } => {
                let id = self.entry_id("reasoning");
                self.push_reasoning(Reasoning { id, summary, text: None, timestamp, encrypted });
            }
            ResponseItem::FunctionCall { name, arguments, call_id } => {
                let call = ToolCall { id: self.entry_id("tool"), name, arguments, call_id, timestamp };
                self.entries.push(CodexEntry::ToolCall(call.clone()));
                let idx = self.current_turn();
                if let Some(call_id) = &call.call_id {
                    self.call_turns.insert(call_id.clone(), idx);
                }
                self.turns[idx].tool_calls.push(call);
            }
            ResponseItem::FunctionCallOutput { call_id, output } => {
                let result = ToolResult { id: self.entry_id("tool-result"), call_id, output, timestamp };
                self.entries.push(CodexEntry::ToolResult(result.clone()));
                let routed = result.call_id.as_ref().and_then(|call_id| self.call_turns.get(call_id).copied());
                let idx = match routed {
                    Some(idx) => idx,
                    None => self.current_turn(),
                };
                self.turns[idx].tool_results.push(result);
            }
            ResponseItem::Other(kind) => debug!(?kind, "Ignoring Codex response item"),
        }
    }

    fn apply_event_msg(&mut self, event: EventMsg, timestamp: Option<DateTime<Utc>>) {
        match event {
            EventMsg::AgentReasoning(Some(raw)) => {
                let text = filter_instruction_tags(&raw);
                if text.is_empty() {
                    return;
                }
                let id = self.entry_id("reasoning");
                self.push_reasoning(Reasoning {
                    id,
                    summary: Some(text.clone()),
                    text: Some(text),
                    timestamp,
                    encrypted: false,
                });
            }
            EventMsg::AgentReasoning(None) => {}
            EventMsg::Message { role, text: Some(raw) } => self.apply_event_message(role, &raw, timestamp),
            EventMsg::Message { text: None, .. } => {}
            EventMsg::TokenCount(info) => self.push_meta_event(MetaEvent::TokenCount { timestamp, info }),
            EventMsg::Other { kind, text } => {
                let id = self.entry_id("event");
                self.entries.push(CodexEntry::System(SystemEvent { id, subtype: kind, text, timestamp }));
            }
            EventMsg::Untyped => debug!("Ignoring Codex event without type"),
        }
    }

    fn apply_event_message(&mut self, role: Role, raw: &str, timestamp: Option<DateTime<Utc>>) {
        let text = filter_instruction_tags(raw);
        let normalized = text.trim();
        if normalized.is_empty() || self.last_seen.get(role) == Some(normalized) {
            return;
        }

        match role {
            Role::User => {
                let duplicate = self
                    .cursor
                    .and_then(|idx| self.turns[idx].user_message.as_ref())
                    .is_some_and(|message| message.text.trim() == normalized);
                if duplicate {
                    return;
                }
                let message = self.push_message(role, normalized.to_string(), timestamp, MessageSource::EventMsg);
                self.attach_user_message(message);
            }
            Role::Assistant => {
                let idx = self.current_turn();
                let duplicate = self.turns[idx]
                    .assistant_messages
                    .iter()
                    .any(|message| message.text.trim() == normalized);
                if duplicate {
                    return;
                }
                let message = self.push_message(role, normalized.to_string(), timestamp, MessageSource::EventMsg);
                self.turns[idx].assistant_messages.push(message);
            }
        }
        self.last_seen.set(role, normalized);
    }

    fn finish(self) -> CodexSession {
        CodexSession {
            entries: self.entries,
            turns: self.turns,
            meta_events: self.meta_events,
            session_meta: self.session_meta,
        }
    }
}

/// Parse the full text of a Codex log into entries, turns and header metadata.
///
/// Never fails: lines that are not valid JSON are logged and skipped, and
/// records of unknown kinds are ignored.
pub fn parse_codex_session(content: &str) -> CodexSession {
    let mut acc = SessionAccumulator::default();

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                warn!(line = line_num + 1, error = %e, "Failed to parse Codex log line");
                continue;
            }
        };

        let timestamp = timestamp_from_value(value.get("timestamp"));
        acc.apply(classify(&value), timestamp);
    }

    acc.finish()
}
