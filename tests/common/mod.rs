//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use agent_history_search::SourceRoots;
use agent_history_search::utils::project_path_to_dir_name;
use serde_json::{Value, json};
use tempfile::TempDir;

pub const SESSION_A: &str = "550e8400-e29b-41d4-a716-446655440000";
pub const SESSION_B: &str = "550e8400-e29b-41d4-a716-446655440001";

/// Builder for a temporary home holding both `.codex` and `.claude` trees
pub struct SourceTreeBuilder {
    temp_dir: TempDir,
}

impl SourceTreeBuilder {
    /// Create a new builder with empty session roots for both sources
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir_all(temp_dir.path().join(".codex/sessions")).expect("Failed to create codex dir");
        fs::create_dir_all(temp_dir.path().join(".claude/projects")).expect("Failed to create claude dir");
        Self { temp_dir }
    }

    /// The temporary home directory
    pub fn home(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn codex_home(&self) -> PathBuf {
        self.temp_dir.path().join(".codex")
    }

    pub fn claude_home(&self) -> PathBuf {
        self.temp_dir.path().join(".claude")
    }

    pub fn roots(&self) -> SourceRoots {
        SourceRoots::new(&self.codex_home(), &self.claude_home())
    }

    /// Add a Codex log at a path relative to `.codex/sessions`
    pub fn with_codex_session(self, relative_path: &str, log: &CodexLogBuilder) -> Self {
        let path = self.codex_home().join("sessions").join(relative_path);
        write_file(&path, &log.build());
        self
    }

    /// Write `.codex/history.jsonl`
    pub fn with_codex_history(self, content: &str) -> Self {
        write_file(&self.codex_home().join("history.jsonl"), content);
        self
    }

    /// Add a Claude Code session under the directory Claude Code uses for `project_path`
    pub fn with_claude_session(self, project_path: &str, session_id: &str, entries: &[ClaudeEntryBuilder]) -> Self {
        let content = entries.iter().map(|e| e.to_json()).collect::<Vec<_>>().join("\n");
        self.with_claude_raw(project_path, session_id, &content)
    }

    /// Add a Claude Code session file with verbatim content
    pub fn with_claude_raw(self, project_path: &str, session_id: &str, content: &str) -> Self {
        let path = self.claude_project_dir(project_path).join(format!("{}.jsonl", session_id));
        write_file(&path, content);
        self
    }

    pub fn claude_project_dir(&self, project_path: &str) -> PathBuf {
        self.claude_home().join("projects").join(project_path_to_dir_name(project_path))
    }

    /// Build and return the temp directory (consumes self)
    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

impl Default for SourceTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    fs::write(path, content).expect("Failed to write file");
}

/// Builder for Codex rollout logs, one JSON record per line
#[derive(Default)]
pub struct CodexLogBuilder {
    lines: Vec<String>,
}

impl CodexLogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(mut self, timestamp: Option<&str>, kind: &str, payload: Value) -> Self {
        let mut record = json!({ "type": kind, "payload": payload });
        if let Some(ts) = timestamp {
            record["timestamp"] = json!(ts);
        }
        self.lines.push(record.to_string());
        self
    }

    /// `session_meta` header naming the session uuid and working directory
    pub fn session_meta(self, id: &str, cwd: &str, timestamp: &str) -> Self {
        self.record(
            Some(timestamp),
            "session_meta",
            json!({ "id": id, "cwd": cwd, "timestamp": timestamp, "originator": "codex_cli_rs", "cli_version": "0.40.0" }),
        )
    }

    pub fn user(self, text: &str, timestamp: &str) -> Self {
        self.record(
            Some(timestamp),
            "response_item",
            json!({ "type": "message", "role": "user", "content": [{ "type": "input_text", "text": text }] }),
        )
    }

    pub fn assistant(self, text: &str, timestamp: &str) -> Self {
        self.record(
            Some(timestamp),
            "response_item",
            json!({ "type": "message", "role": "assistant", "content": [{ "type": "output_text", "text": text }] }),
        )
    }

    pub fn reasoning(self, summary: &str, timestamp: &str) -> Self {
        self.record(
            Some(timestamp),
            "response_item",
            json!({ "type": "reasoning", "summary": [{ "type": "summary_text", "text": summary }] }),
        )
    }

    pub fn function_call(self, name: &str, call_id: &str, timestamp: &str) -> Self {
        self.record(
            Some(timestamp),
            "response_item",
            json!({ "type": "function_call", "name": name, "arguments": "{\"command\":[\"ls\"]}", "call_id": call_id }),
        )
    }

    pub fn function_call_output(self, call_id: &str, output: &str, timestamp: &str) -> Self {
        self.record(
            Some(timestamp),
            "response_item",
            json!({ "type": "function_call_output", "call_id": call_id, "output": output }),
        )
    }

    /// A verbatim line, e.g. malformed JSON
    pub fn raw(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    pub fn build(&self) -> String {
        let mut content = self.lines.join("\n");
        content.push('\n');
        content
    }
}

/// Builder for Claude Code user and assistant entries
pub struct ClaudeEntryBuilder {
    entry_type: &'static str,
    text: String,
    timestamp: String,
    cwd: String,
    uuid: String,
    model: String,
}

impl ClaudeEntryBuilder {
    /// Create a new user message
    pub fn user(text: &str) -> Self {
        Self {
            entry_type: "user",
            text: text.to_string(),
            timestamp: "2024-01-01T10:00:00.000Z".to_string(),
            cwd: "/work/app".to_string(),
            uuid: "650e8400-e29b-41d4-a716-446655440001".to_string(),
            model: String::new(),
        }
    }

    /// Create a new assistant message with a single text block
    pub fn assistant(text: &str) -> Self {
        Self {
            entry_type: "assistant",
            text: text.to_string(),
            timestamp: "2024-01-01T10:00:05.000Z".to_string(),
            cwd: "/work/app".to_string(),
            uuid: "650e8400-e29b-41d4-a716-446655440002".to_string(),
            model: "claude-sonnet-4-5".to_string(),
        }
    }

    pub fn timestamp(mut self, timestamp: &str) -> Self {
        self.timestamp = timestamp.to_string();
        self
    }

    pub fn cwd(mut self, cwd: &str) -> Self {
        self.cwd = cwd.to_string();
        self
    }

    pub fn uuid(mut self, uuid: &str) -> Self {
        self.uuid = uuid.to_string();
        self
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> String {
        let message = match self.entry_type {
            "user" => json!({ "role": "user", "content": self.text }),
            _ => json!({
                "id": "msg_01",
                "type": "message",
                "role": "assistant",
                "model": self.model,
                "content": [{ "type": "text", "text": self.text }],
                "stop_reason": "end_turn",
                "stop_sequence": null,
                "usage": { "input_tokens": 1000, "output_tokens": 200, "cache_creation_input_tokens": 0, "cache_read_input_tokens": 0 }
            }),
        };
        json!({
            "type": self.entry_type,
            "isSidechain": false,
            "userType": "external",
            "cwd": self.cwd,
            "sessionId": SESSION_A,
            "version": "1.0.100",
            "uuid": self.uuid,
            "timestamp": self.timestamp,
            "parentUuid": null,
            "message": message
        })
        .to_string()
    }
}
