use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::claude::ClaudeEntry;
use super::codex::CodexSession;
use super::search::Source;

/// How the first message of a session reads once slash-command markup is decoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ParsedCommand {
    #[serde(rename_all = "camelCase")]
    Command {
        command_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        command_args: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        command_message: Option<String>,
    },
    LocalCommand {
        stdout: String,
    },
    Text {
        content: String,
    },
}

impl ParsedCommand {
    /// Single-line label used when listing sessions
    pub fn title(&self) -> String {
        match self {
            ParsedCommand::Command { command_name, command_args, .. } => match command_args {
                Some(args) if !args.trim().is_empty() => {
                    format!("{} {}", command_name.trim(), args.trim())
                }
                _ => command_name.trim().to_string(),
            },
            ParsedCommand::LocalCommand { stdout } => stdout.trim().to_string(),
            ParsedCommand::Text { content } => {
                content.lines().map(str::trim).find(|line| !line.is_empty()).unwrap_or("").to_string()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_creation_tokens: u64,
    pub cache_read_tokens: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCost {
    pub total_usd: f64,
    pub token_usage: TokenUsage,
}

/// Derived summary of a Claude Code session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaudeSessionSummary {
    pub message_count: usize,
    pub first_user_message: Option<String>,
    pub model_name: Option<String>,
    pub cost: SessionCost,
}

impl ClaudeSessionSummary {
    pub fn title(&self) -> Option<String> {
        self.first_user_message.as_deref().map(|text| crate::parsers::parse_command_xml(text).title())
    }
}

/// Derived summary of a Codex session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodexSessionSummary {
    pub message_count: usize,
    pub first_command: Option<ParsedCommand>,
    pub last_modified_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodexSessionDetail {
    pub id: String,
    pub session_uuid: Option<String>,
    pub file_path: PathBuf,
    pub meta: CodexSessionSummary,
    pub session: CodexSession,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaudeSessionDetail {
    pub id: String,
    pub file_path: PathBuf,
    pub last_modified_at: Option<DateTime<Utc>>,
    pub meta: ClaudeSessionSummary,
    pub entries: Vec<ClaudeEntry>,
}

/// Summary of one project (working directory) in either source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMeta {
    pub id: String,
    pub source: Source,
    pub workspace_name: String,
    pub workspace_path: String,
    pub last_session_at: Option<DateTime<Utc>>,
    pub session_count: usize,
}

/// A project path and the sources it has sessions in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPathEntry {
    pub path: String,
    pub sources: BTreeSet<Source>,
}
