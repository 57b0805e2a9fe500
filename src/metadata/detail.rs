//! Loading a single session by its opaque project and session ids

use std::path::Path;

use anyhow::{Result, bail};
use tracing::warn;

use super::session::{FileTimes, claude_session_summary, codex_session_summary};
use crate::discovery::read_session_header;
use crate::discovery::claude::is_session_file_name;
use crate::models::{ClaudeSessionDetail, CodexSessionDetail};
use crate::parsers::{parse_claude_session, parse_codex_session};
use crate::utils::{decode_id, decode_path_id};

async fn file_times(path: &Path) -> FileTimes {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => FileTimes::from_metadata(&metadata),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to stat session file");
            FileTimes::default()
        }
    }
}

/// Read a file, degrading to empty content when it cannot be read
async fn read_or_empty(path: &Path) -> String {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read session file");
            String::new()
        }
    }
}

/// Load a Codex session.
///
/// `project_id` encodes the workspace path and `session_id` the log path. An
/// unreadable log yields a session with no entries rather than an error.
///
/// # Errors
///
/// Returns an error if an id does not decode, or if the log's header names a
/// different workspace than the project.
pub async fn load_codex_session(project_id: &str, session_id: &str) -> Result<CodexSessionDetail> {
    let workspace_path = decode_id(project_id)?;
    let session_path = decode_path_id(session_id)?;

    let header = read_session_header(&session_path).await;
    if let Some(recorded) = header.as_ref().and_then(|h| h.workspace_path.as_deref())
        && recorded != workspace_path
    {
        bail!("Session does not belong to the requested project");
    }

    let content = read_or_empty(&session_path).await;
    let session = parse_codex_session(&content);
    let meta = codex_session_summary(&session, file_times(&session_path).await);

    Ok(CodexSessionDetail {
        id: session_id.to_string(),
        session_uuid: header.and_then(|h| h.session_uuid),
        file_path: session_path,
        meta,
        session,
    })
}

/// Load a Claude Code session.
///
/// `project_id` encodes the project directory and `session_id` is the session
/// file stem. Returns `None` when the ids are invalid or the file cannot be read.
pub async fn load_claude_session(project_id: &str, session_id: &str) -> Option<ClaudeSessionDetail> {
    let project_dir = match decode_path_id(project_id) {
        Ok(dir) => dir,
        Err(e) => {
            warn!(error = %e, "Invalid Claude Code project id");
            return None;
        }
    };
    let file_name = format!("{}.jsonl", session_id);
    if !is_session_file_name(&file_name) {
        warn!(session_id, "Invalid Claude Code session id");
        return None;
    }

    let file_path = project_dir.join(file_name);
    let content = match tokio::fs::read_to_string(&file_path).await {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %file_path.display(), error = %e, "Failed to read session file");
            return None;
        }
    };

    let entries = parse_claude_session(&content);
    Some(ClaudeSessionDetail {
        id: session_id.to_string(),
        last_modified_at: file_times(&file_path).await.modified,
        meta: claude_session_summary(&entries),
        file_path,
        entries,
    })
}
