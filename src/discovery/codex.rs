//! Codex session discovery
//!
//! Codex writes one rollout log per session somewhere below
//! `<codex home>/sessions/` (nested by date). The first line of a log is a
//! `session_meta` record naming the working directory, which is what groups
//! sessions into projects.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::claude::modified_at;
use crate::config::SourceRoots;
use crate::metadata::load_history_timestamps;
use crate::models::{ProjectMeta, Source};
use crate::parsers::deserializers::{parse_timestamp, timestamp_from_value};
use crate::utils::{encode_id, workspace_name};

/// Number of session files read concurrently while listing
const DISCOVERY_CONCURRENCY: usize = 16;

/// What the first line of a Codex log says about the session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodexSessionHeader {
    pub session_uuid: Option<String>,
    pub workspace_path: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub instructions: Option<String>,
}

/// A discovered session log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodexSessionRecord {
    pub header: CodexSessionHeader,
    pub file_path: PathBuf,
    pub last_modified_at: Option<DateTime<Utc>>,
}

impl CodexSessionRecord {
    /// Opaque id of the session: the encoded log path
    pub fn id(&self) -> String {
        encode_id(&self.file_path.to_string_lossy())
    }
}

/// Header of a log's first line, `None` unless it is a `session_meta` record
pub fn parse_session_header(first_line: &str) -> Option<CodexSessionHeader> {
    let value: Value = serde_json::from_str(first_line.trim()).ok()?;
    if value.get("type").and_then(Value::as_str) != Some("session_meta") {
        return None;
    }

    let payload = value.get("payload");
    let field = |key: &str| payload.and_then(|p| p.get(key)).and_then(Value::as_str).map(str::to_string);
    let started_at = match field("timestamp") {
        Some(raw) => parse_timestamp(&raw),
        None => timestamp_from_value(value.get("timestamp")),
    };

    Some(CodexSessionHeader {
        session_uuid: field("id"),
        workspace_path: field("cwd"),
        started_at,
        instructions: field("instructions"),
    })
}

/// Read only the first line of a log and parse its header
pub async fn read_session_header(path: &Path) -> Option<CodexSessionHeader> {
    let file = match tokio::fs::File::open(path).await {
        Ok(file) => file,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to open session file");
            return None;
        }
    };
    match BufReader::new(file).lines().next_line().await {
        Ok(Some(line)) => parse_session_header(&line),
        Ok(None) => None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read session header");
            None
        }
    }
}

/// Every `.jsonl` file below the sessions root, in path order
pub async fn list_codex_session_files(sessions_root: &Path) -> Vec<PathBuf> {
    let root = sessions_root.to_path_buf();
    let walk = tokio::task::spawn_blocking(move || {
        WalkDir::new(&root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!(error = %e, "Skipping unreadable entry under Codex sessions");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".jsonl"))
            .map(|entry| entry.into_path())
            .collect::<Vec<_>>()
    });

    match walk.await {
        Ok(files) => files,
        Err(e) => {
            warn!(error = %e, "Codex session walk failed");
            Vec::new()
        }
    }
}

async fn read_session_record(file_path: PathBuf) -> Option<CodexSessionRecord> {
    let header = read_session_header(&file_path).await?;
    let last_modified_at = match tokio::fs::metadata(&file_path).await {
        Ok(metadata) => modified_at(&metadata),
        Err(e) => {
            warn!(path = %file_path.display(), error = %e, "Failed to stat session file");
            None
        }
    };
    Some(CodexSessionRecord { header, file_path, last_modified_at })
}

/// Raise each record's last activity to the newest prompt in the history file
fn apply_history_timestamps(records: &mut [CodexSessionRecord], history: &crate::metadata::HistoryTimestamps) {
    for record in records {
        let Some(latest) = record.header.session_uuid.as_ref().and_then(|uuid| history.get(uuid)) else {
            continue;
        };
        if record.last_modified_at.is_none_or(|current| *latest > current) {
            record.last_modified_at = Some(*latest);
        }
    }
}

/// All Codex sessions that start with a `session_meta` header
pub async fn list_codex_sessions(roots: &SourceRoots) -> Vec<CodexSessionRecord> {
    let files = list_codex_session_files(&roots.codex_sessions_dir).await;

    let mut records: Vec<CodexSessionRecord> = stream::iter(files)
        .map(read_session_record)
        .buffered(DISCOVERY_CONCURRENCY)
        .filter_map(|record| async move { record })
        .collect()
        .await;

    let history = load_history_timestamps(roots.codex_history_file.clone()).await;
    apply_history_timestamps(&mut records, &history);
    records
}

/// Group sessions by working directory into projects, most recently used first
pub fn group_codex_projects(records: &[CodexSessionRecord]) -> Vec<ProjectMeta> {
    let mut by_workspace: BTreeMap<&str, Vec<&CodexSessionRecord>> = BTreeMap::new();
    for record in records {
        if let Some(workspace) = record.header.workspace_path.as_deref() {
            by_workspace.entry(workspace).or_default().push(record);
        }
    }

    let mut projects: Vec<ProjectMeta> = by_workspace
        .into_iter()
        .map(|(workspace, sessions)| ProjectMeta {
            id: encode_id(workspace),
            source: Source::Codex,
            workspace_name: workspace_name(workspace),
            workspace_path: workspace.to_string(),
            last_session_at: sessions.iter().filter_map(|s| s.last_modified_at).max(),
            session_count: sessions.len(),
        })
        .collect();

    projects.sort_by(|a, b| b.last_session_at.cmp(&a.last_session_at));
    projects
}

pub async fn list_codex_projects(roots: &SourceRoots) -> Vec<ProjectMeta> {
    group_codex_projects(&list_codex_sessions(roots).await)
}
