//! Typed shapes of Claude Code session log lines.
//!
//! Every line of a session file is one of a closed set of entry shapes,
//! discriminated by `type` (and `subtype` for system entries). Lines that
//! match none of them are kept as [`ErrorRecord`]s.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::parsers::deserializers::{deserialize_hyphenated_uuid, deserialize_opt_hyphenated_uuid, parse_timestamp};

/// Maximum number of characters kept for a first-message preview
pub const FIRST_TEXT_MAX_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    External,
}

/// Fields shared by user, assistant, progress and system entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseEntry {
    pub is_sidechain: bool,
    pub user_type: UserType,
    pub cwd: String,
    pub session_id: String,
    pub version: String,
    #[serde(deserialize_with = "deserialize_hyphenated_uuid")]
    pub uuid: Uuid,
    pub timestamp: String,
    #[serde(deserialize_with = "deserialize_opt_hyphenated_uuid")]
    pub parent_uuid: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_meta: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_use_result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_compact_summary: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Content blocks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageMediaType {
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/gif")]
    Gif,
    #[serde(rename = "image/webp")]
    Webp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ImageSource {
    Base64 { data: String, media_type: ImageMediaType },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentMediaType {
    #[serde(rename = "text/plain")]
    TextPlain,
    #[serde(rename = "application/pdf")]
    Pdf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DocumentSource {
    Text { media_type: DocumentMediaType, data: String },
    Base64 { media_type: DocumentMediaType, data: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolResultItem {
    Text { text: String },
    Image { source: ImageSource },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolResultContent {
    Text(String),
    Items(Vec<ToolResultItem>),
}

impl ToolResultContent {
    /// Plain text carried by the result, images dropped
    pub fn text(&self) -> String {
        match self {
            ToolResultContent::Text(text) => text.clone(),
            ToolResultContent::Items(items) => items
                .iter()
                .filter_map(|item| match item {
                    ToolResultItem::Text { text } => Some(text.as_str()),
                    ToolResultItem::Image { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResultBlock {
    pub tool_use_id: String,
    pub content: ToolResultContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl ToolResultBlock {
    /// Bracketed placeholder followed by the result's inner text
    pub fn display_text(&self) -> String {
        let inner = self.content.text();
        if inner.is_empty() { "[Tool Result]".to_string() } else { format!("[Tool Result] {inner}") }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UserContentBlock {
    Text { text: String },
    ToolResult(ToolResultBlock),
    Image { source: ImageSource },
    Document { source: DocumentSource },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserContentItem {
    Text(String),
    Block(UserContentBlock),
}

/// User message content: either a bare string or a list of items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserContent {
    Text(String),
    Items(Vec<UserContentItem>),
}

impl UserContent {
    /// Human-readable rendering of the whole content.
    ///
    /// Plain strings and text blocks contribute their text, tool results a
    /// `[Tool Result]` placeholder plus their inner text. Images and documents
    /// contribute nothing.
    pub fn display_text(&self) -> String {
        match self {
            UserContent::Text(text) => text.clone(),
            UserContent::Items(items) => items
                .iter()
                .filter_map(|item| match item {
                    UserContentItem::Text(text) => Some(text.clone()),
                    UserContentItem::Block(UserContentBlock::Text { text }) => Some(text.clone()),
                    UserContentItem::Block(UserContentBlock::ToolResult(result)) => {
                        Some(result.display_text())
                    }
                    UserContentItem::Block(_) => None,
                })
                .filter(|text| !text.is_empty())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// First string or text block, truncated to [`FIRST_TEXT_MAX_CHARS`]
    pub fn first_text(&self) -> Option<String> {
        let text = match self {
            UserContent::Text(text) => Some(text.as_str()),
            UserContent::Items(items) => items.iter().find_map(|item| match item {
                UserContentItem::Text(text) => Some(text.as_str()),
                UserContentItem::Block(UserContentBlock::Text { text }) => Some(text.as_str()),
                UserContentItem::Block(_) => None,
            }),
        }?;
        Some(text.chars().take(FIRST_TEXT_MAX_CHARS).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssistantContentBlock {
    Thinking {
        thinking: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        signature: Option<String>,
    },
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult(ToolResultBlock),
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssistantRole {
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Message,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserMessage {
    pub role: UserRole,
    pub content: UserContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheCreation {
    pub ephemeral_5m_input_tokens: u64,
    pub ephemeral_1h_input_tokens: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerToolUse {
    pub web_search_requests: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    #[serde(default)]
    pub cache_creation_input_tokens: Option<u64>,
    #[serde(default)]
    pub cache_read_input_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_creation: Option<CacheCreation>,
    pub output_tokens: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_tier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_tool_use: Option<ServerToolUse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantMessage {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub role: AssistantRole,
    pub model: String,
    pub content: Vec<AssistantContentBlock>,
    pub stop_reason: Option<String>,
    pub stop_sequence: Option<String>,
    pub usage: Usage,
}

impl AssistantMessage {
    /// Text blocks only, joined by newlines. Thinking and tool blocks are skipped.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                AssistantContentBlock::Text { text } if !text.is_empty() => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserEntry {
    #[serde(flatten)]
    pub base: BaseEntry,
    pub message: UserMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantEntry {
    #[serde(flatten)]
    pub base: BaseEntry,
    pub message: AssistantMessage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_api_error_message: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryEntry {
    pub summary: String,
    #[serde(deserialize_with = "deserialize_hyphenated_uuid")]
    pub leaf_uuid: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    #[serde(flatten)]
    pub base: BaseEntry,
    pub data: Map<String, Value>,
    #[serde(rename = "toolUseID", default, skip_serializing_if = "Option::is_none")]
    pub tool_use_id: Option<String>,
    #[serde(rename = "parentToolUseID", default, skip_serializing_if = "Option::is_none")]
    pub parent_tool_use_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSnapshot {
    pub message_id: String,
    pub tracked_file_backups: Map<String, Value>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileHistorySnapshotEntry {
    pub message_id: String,
    pub snapshot: FileSnapshot,
    pub is_snapshot_update: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation")]
pub enum QueueOperationEntry {
    #[serde(rename = "enqueue", rename_all = "camelCase")]
    Enqueue { content: UserContent, session_id: String, timestamp: String },
    #[serde(rename = "dequeue", rename_all = "camelCase")]
    Dequeue { session_id: String, timestamp: String },
    #[serde(rename = "remove", rename_all = "camelCase")]
    Remove { session_id: String, timestamp: String },
    #[serde(rename = "popAll", rename_all = "camelCase")]
    PopAll {
        session_id: String,
        timestamp: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
    },
}

impl QueueOperationEntry {
    pub fn timestamp(&self) -> &str {
        match self {
            QueueOperationEntry::Enqueue { timestamp, .. }
            | QueueOperationEntry::Dequeue { timestamp, .. }
            | QueueOperationEntry::Remove { timestamp, .. }
            | QueueOperationEntry::PopAll { timestamp, .. } => timestamp,
        }
    }
}

// ---------------------------------------------------------------------------
// System entries
// ---------------------------------------------------------------------------

/// Level of system entries that only ever report information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InfoLevel {
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopHookLevel {
    Info,
    Suggestion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiErrorLevel {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookInfo {
    pub command: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopHookSummaryEntry {
    #[serde(flatten)]
    pub base: BaseEntry,
    #[serde(rename = "toolUseID")]
    pub tool_use_id: String,
    pub level: StopHookLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub hook_count: u64,
    pub hook_infos: Vec<HookInfo>,
    pub hook_errors: Vec<Value>,
    pub prevented_continuation: bool,
    pub stop_reason: String,
    pub has_output: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalCommandEntry {
    #[serde(flatten)]
    pub base: BaseEntry,
    pub content: String,
    pub level: InfoLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnDurationEntry {
    #[serde(flatten)]
    pub base: BaseEntry,
    pub duration_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactMetadata {
    pub trigger: String,
    pub pre_tokens: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactBoundaryEntry {
    #[serde(flatten)]
    pub base: BaseEntry,
    pub content: String,
    pub level: InfoLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logical_parent_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compact_metadata: Option<CompactMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorInner {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorInner>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Map<String, Value>>,
    #[serde(rename = "requestID", default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorEntry {
    #[serde(flatten)]
    pub base: BaseEntry,
    pub level: ApiErrorLevel,
    pub error: ApiErrorDetail,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_in_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_attempt: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
}

/// System entry written before subtypes existed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacySystemEntry {
    #[serde(flatten)]
    pub base: BaseEntry,
    pub content: String,
    #[serde(rename = "toolUseID")]
    pub tool_use_id: String,
    pub level: InfoLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "subtype", rename_all = "snake_case")]
pub enum SystemEntry {
    StopHookSummary(StopHookSummaryEntry),
    LocalCommand(LocalCommandEntry),
    TurnDuration(TurnDurationEntry),
    CompactBoundary(CompactBoundaryEntry),
    ApiError(ApiErrorEntry),
    Legacy(LegacySystemEntry),
}

impl SystemEntry {
    pub fn base(&self) -> &BaseEntry {
        match self {
            SystemEntry::StopHookSummary(e) => &e.base,
            SystemEntry::LocalCommand(e) => &e.base,
            SystemEntry::TurnDuration(e) => &e.base,
            SystemEntry::CompactBoundary(e) => &e.base,
            SystemEntry::ApiError(e) => &e.base,
            SystemEntry::Legacy(e) => &e.base,
        }
    }
}

/// A line that is not JSON or matches no known entry shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    pub line: String,
    pub line_number: usize,
}

/// One validated line of a Claude Code session file
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClaudeEntry {
    User(UserEntry),
    Assistant(AssistantEntry),
    Summary(SummaryEntry),
    System(SystemEntry),
    Progress(ProgressEntry),
    FileHistorySnapshot(FileHistorySnapshotEntry),
    QueueOperation(QueueOperationEntry),
    #[serde(rename = "x-error")]
    Error(ErrorRecord),
}

impl ClaudeEntry {
    fn base(&self) -> Option<&BaseEntry> {
        match self {
            ClaudeEntry::User(e) => Some(&e.base),
            ClaudeEntry::Assistant(e) => Some(&e.base),
            ClaudeEntry::Progress(e) => Some(&e.base),
            ClaudeEntry::System(e) => Some(e.base()),
            _ => None,
        }
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let raw: &str = match self {
            ClaudeEntry::QueueOperation(op) => op.timestamp(),
            ClaudeEntry::FileHistorySnapshot(e) => &e.snapshot.timestamp,
            other => &other.base()?.timestamp,
        };
        parse_timestamp(raw)
    }

    /// Working directory recorded on the entry, if the shape carries one
    pub fn cwd(&self) -> Option<&str> {
        self.base().map(|base| base.cwd.as_str())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ClaudeEntry::Error(_))
    }

    pub fn is_message(&self) -> bool {
        matches!(self, ClaudeEntry::User(_) | ClaudeEntry::Assistant(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_content_display_text_mixed_items() {
        let content: UserContent = serde_json::from_str(
            r#"["plain",{"type":"text","text":"block"},{"type":"tool_result","tool_use_id":"t1","content":"output"},{"type":"image","source":{"type":"base64","data":"AA==","media_type":"image/png"}}]"#,
        )
        .unwrap();
        assert_eq!(content.display_text(), "plain\nblock\n[Tool Result] output");
    }

    #[test]
    fn test_tool_result_with_structured_content_uses_inner_text() {
        let content: UserContent = serde_json::from_str(
            r#"[{"type":"tool_result","tool_use_id":"t1","content":[{"type":"text","text":"line one"},{"type":"image","source":{"type":"base64","data":"AA==","media_type":"image/gif"}}]}]"#,
        )
        .unwrap();
        assert_eq!(content.display_text(), "[Tool Result] line one");
    }

    #[test]
    fn test_tool_result_without_text_is_bare_placeholder() {
        let block = ToolResultBlock {
            tool_use_id: "t1".to_string(),
            content: ToolResultContent::Items(Vec::new()),
            is_error: None,
        };
        assert_eq!(block.display_text(), "[Tool Result]");
    }

    #[test]
    fn test_first_text_skips_tool_results_and_truncates() {
        let long = "x".repeat(250);
        let content = UserContent::Items(vec![
            UserContentItem::Block(UserContentBlock::ToolResult(ToolResultBlock {
                tool_use_id: "t1".to_string(),
                content: ToolResultContent::Text("ignored".to_string()),
                is_error: None,
            })),
            UserContentItem::Block(UserContentBlock::Text { text: long }),
        ]);
        let first = content.first_text().unwrap();
        assert_eq!(first.chars().count(), FIRST_TEXT_MAX_CHARS);
    }

    #[test]
    fn test_first_text_none_when_only_images() {
        let content: UserContent = serde_json::from_str(
            r#"[{"type":"image","source":{"type":"base64","data":"AA==","media_type":"image/webp"}}]"#,
        )
        .unwrap();
        assert!(content.first_text().is_none());
    }

    #[test]
    fn test_assistant_text_only_text_blocks() {
        let message: AssistantMessage = serde_json::from_str(
            r#"{"id":"msg_1","type":"message","role":"assistant","model":"claude-sonnet","content":[{"type":"thinking","thinking":"hmm"},{"type":"text","text":"Answer"},{"type":"tool_use","id":"t","name":"Bash","input":{"command":"ls"}},{"type":"text","text":"More"}],"stop_reason":null,"stop_sequence":null,"usage":{"input_tokens":1,"output_tokens":2}}"#,
        )
        .unwrap();
        assert_eq!(message.text(), "Answer\nMore");
    }
}
