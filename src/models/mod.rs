//! Data models for Codex and Claude Code conversation history.
//!
//! - [`codex`] - Entries, turns and session header reconstructed from Codex logs
//! - [`history`] - Lines of the Codex prompt history file
//! - [`claude`] - The closed set of Claude Code session line shapes
//! - [`meta`] - Derived, read-only summaries of sessions and projects
//! - [`search`] - Search requests, results and pages
//!
//! Everything here is recomputed from the immutable log files on each read.

pub mod claude;
pub mod codex;
pub mod history;
pub mod meta;
pub mod search;

pub use claude::{ClaudeEntry, ErrorRecord, SystemEntry};
pub use codex::{
    CodexEntry, CodexMessage, CodexSession, CodexSessionMeta, MessageSource, MetaEvent, Reasoning,
    SystemEvent, ToolCall, ToolPair, ToolResult, Turn,
};
pub use history::CodexHistoryEntry;
pub use meta::{
    ClaudeSessionDetail, ClaudeSessionSummary, CodexSessionDetail, CodexSessionSummary,
    ParsedCommand, ProjectMeta, ProjectPathEntry, SessionCost, TokenUsage,
};
pub use search::{DEFAULT_SEARCH_LIMIT, Role, SearchPage, SearchRequest, SearchResult, Source};
