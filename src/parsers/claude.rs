//! Claude Code session validator
//!
//! Every non-empty line of a session file becomes exactly one [`ClaudeEntry`].
//! Lines that are not JSON, or whose JSON matches none of the known shapes,
//! become [`ClaudeEntry::Error`] records carrying the raw line so a single bad
//! line never hides the rest of the session.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::models::claude::{
    ApiErrorEntry, AssistantEntry, CompactBoundaryEntry, FileHistorySnapshotEntry,
    LegacySystemEntry, LocalCommandEntry, ProgressEntry, QueueOperationEntry,
    StopHookSummaryEntry, SummaryEntry, TurnDurationEntry, UserEntry,
};
use crate::models::{ClaudeEntry, ErrorRecord, SystemEntry};

fn shape<'a, T: Deserialize<'a>>(value: &'a Value) -> Option<T> {
    T::deserialize(value).ok()
}

/// Try the system subtypes in priority order; the subtype-less legacy shape last
fn validate_system(value: &Value) -> Option<SystemEntry> {
    match value.get("subtype") {
        Some(Value::String(subtype)) => match subtype.as_str() {
            "stop_hook_summary" => shape(value).map(SystemEntry::StopHookSummary),
            "local_command" => shape(value).map(SystemEntry::LocalCommand),
            "turn_duration" => shape(value).map(SystemEntry::TurnDuration),
            "compact_boundary" => shape(value).map(SystemEntry::CompactBoundary),
            "api_error" => shape(value).map(SystemEntry::ApiError),
            _ => None,
        },
        Some(_) => None,
        None => shape::<LegacySystemEntry>(value).map(SystemEntry::Legacy),
    }
}

/// Validate one decoded line against the closed set of entry shapes
pub fn validate_entry(value: &Value) -> Option<ClaudeEntry> {
    match value.get("type").and_then(Value::as_str)? {
        "user" => shape::<UserEntry>(value).map(ClaudeEntry::User),
        "assistant" => shape::<AssistantEntry>(value).map(ClaudeEntry::Assistant),
        "summary" => shape::<SummaryEntry>(value).map(ClaudeEntry::Summary),
        "system" => validate_system(value).map(ClaudeEntry::System),
        "progress" => shape::<ProgressEntry>(value).map(ClaudeEntry::Progress),
        "file-history-snapshot" => {
            shape::<FileHistorySnapshotEntry>(value).map(ClaudeEntry::FileHistorySnapshot)
        }
        "queue-operation" => shape::<QueueOperationEntry>(value).map(ClaudeEntry::QueueOperation),
        _ => None,
    }
}

/// Parse the full text of a Claude Code session file.
///
/// Line numbers in error records are 1-based and count non-blank lines only.
pub fn parse_claude_session(content: &str) -> Vec<ClaudeEntry> {
    let mut entries = Vec::new();
    let mut error_count = 0;

    // Blank lines are dropped before numbering
    for (line_num, line) in content.lines().filter(|line| !line.trim().is_empty()).enumerate() {
        let trimmed = line.trim();
        let entry = serde_json::from_str::<Value>(trimmed).ok().and_then(|value| validate_entry(&value));
        match entry {
            Some(entry) => entries.push(entry),
            None => {
                error_count += 1;
                entries.push(ClaudeEntry::Error(ErrorRecord {
                    line: line.to_string(),
                    line_number: line_num + 1,
                }));
            }
        }
    }

    if error_count > 0 {
        debug!(entries = entries.len(), errors = error_count, "Claude session contains unrecognized lines");
    }

    entries
}
