use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::warn;

use crate::models::CodexHistoryEntry;

/// Newest prompt timestamp per Codex session id.
/// Malformed lines are logged and skipped; lines without a numeric `ts` are ignored.
pub fn parse_history_timestamps(content: &str) -> HashMap<String, DateTime<Utc>> {
    let mut timestamps: HashMap<String, DateTime<Utc>> = HashMap::new();

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let entry = match serde_json::from_str::<CodexHistoryEntry>(line) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(line = line_num + 1, error = %e, "Failed to parse history entry");
                continue;
            }
        };

        let Some(ts) = entry.timestamp else {
            continue;
        };
        timestamps
            .entry(entry.session_id)
            .and_modify(|current| {
                if ts > *current {
                    *current = ts;
                }
            })
            .or_insert(ts);
    }

    timestamps
}

/// Entry on the last non-empty line, if it parses
pub fn parse_latest_history_entry(content: &str) -> Option<CodexHistoryEntry> {
    let last = content.lines().rev().map(str::trim).find(|line| !line.is_empty())?;
    match serde_json::from_str(last) {
        Ok(entry) => Some(entry),
        Err(e) => {
            warn!(error = %e, "Failed to parse latest history entry");
            None
        }
    }
}

/// Read the history file and return its most recent entry.
/// A missing file is not an error and yields `None`.
pub async fn read_latest_history_entry(path: &Path) -> Result<Option<CodexHistoryEntry>> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Ok(None);
    }
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read history file: {}", path.display()))?;
    Ok(parse_latest_history_entry(&content))
}
