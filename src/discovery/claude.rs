//! Claude Code project and session discovery
//!
//! Layout: `<claude dir>/projects/<encoded project dir>/<session uuid>.jsonl`,
//! optionally with a `sessions-index.json` recording the original project path.
//! Every failure degrades to "nothing found" and is logged.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Deserialize;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use crate::config::SourceRoots;
use crate::models::{ProjectMeta, Source};
use crate::parsers::deserializers::parse_hyphenated_uuid;
use crate::utils::{dir_name_to_project_path, encode_id, workspace_name};

const SESSIONS_INDEX_FILE: &str = "sessions-index.json";
const SESSION_EXTENSION: &str = ".jsonl";

/// One `<uuid>.jsonl` file in a project directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaudeSessionFile {
    pub session_id: String,
    pub path: PathBuf,
    pub last_modified_at: Option<DateTime<Utc>>,
}

/// A project directory and the display path it stands for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaudeProjectDir {
    pub dir: PathBuf,
    pub project_path: String,
}

impl ClaudeProjectDir {
    /// Opaque id of the project: the encoded project directory path
    pub fn id(&self) -> String {
        encode_id(&self.dir.to_string_lossy())
    }
}

/// Whether a file name is a top-level session log (`<uuid>.jsonl`).
/// Sub-agent logs such as `agent-<id>.jsonl` are excluded.
pub fn is_session_file_name(name: &str) -> bool {
    name.strip_suffix(SESSION_EXTENSION)
        .is_some_and(|stem| parse_hyphenated_uuid(stem).is_some())
}

pub(crate) fn modified_at(metadata: &std::fs::Metadata) -> Option<DateTime<Utc>> {
    metadata.modified().ok().map(DateTime::<Utc>::from)
}

/// Sorted entries of a directory; a missing or unreadable directory yields nothing
async fn read_dir_sorted(dir: &Path) -> Vec<(String, PathBuf, std::fs::Metadata)> {
    let mut reader = match tokio::fs::read_dir(dir).await {
        Ok(reader) => reader,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(dir = %dir.display(), error = %e, "Failed to read directory");
            }
            return Vec::new();
        }
    };

    let mut entries = Vec::new();
    loop {
        match reader.next_entry().await {
            Ok(Some(entry)) => {
                let path = entry.path();
                // Follows symlinks, like a plain stat
                match tokio::fs::metadata(&path).await {
                    Ok(metadata) => {
                        entries.push((entry.file_name().to_string_lossy().into_owned(), path, metadata))
                    }
                    Err(e) => debug!(path = %path.display(), error = %e, "Skipping unreadable entry"),
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Failed to read directory entry");
                break;
            }
        }
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
}

/// Project directories under the projects root, in name order
pub async fn list_project_dirs(projects_root: &Path) -> Vec<PathBuf> {
    read_dir_sorted(projects_root)
        .await
        .into_iter()
        .filter(|(_, _, metadata)| metadata.is_dir())
        .map(|(_, path, _)| path)
        .collect()
}

/// Session files of a project in name order
pub async fn list_session_files(project_dir: &Path) -> Vec<ClaudeSessionFile> {
    read_dir_sorted(project_dir)
        .await
        .into_iter()
        .filter(|(name, _, metadata)| metadata.is_file() && is_session_file_name(name))
        .map(|(name, path, metadata)| ClaudeSessionFile {
            session_id: name.trim_end_matches(SESSION_EXTENSION).to_string(),
            path,
            last_modified_at: modified_at(&metadata),
        })
        .collect()
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionsIndex {
    #[serde(default)]
    original_path: Option<String>,
    #[serde(default)]
    entries: Vec<SessionsIndexEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionsIndexEntry {
    #[serde(default)]
    project_path: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

async fn read_path_from_index(project_dir: &Path) -> Option<String> {
    let content = tokio::fs::read_to_string(project_dir.join(SESSIONS_INDEX_FILE)).await.ok()?;
    let index: SessionsIndex = match serde_json::from_str(&content) {
        Ok(index) => index,
        Err(e) => {
            debug!(dir = %project_dir.display(), error = %e, "Ignoring malformed sessions index");
            return None;
        }
    };
    non_empty(index.original_path)
        .or_else(|| index.entries.into_iter().next().and_then(|entry| non_empty(entry.project_path)))
}

/// First `cwd` recorded in a session file
pub async fn read_first_cwd(path: &Path) -> Option<String> {
    let file = tokio::fs::File::open(path).await.ok()?;
    let mut lines = BufReader::new(file).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let Ok(value) = serde_json::from_str::<Value>(&line) else {
            continue;
        };
        if let Some(cwd) = value.get("cwd").and_then(Value::as_str).filter(|cwd| !cwd.is_empty()) {
            return Some(cwd.to_string());
        }
    }
    None
}

/// Display path of a project directory.
///
/// Tried in order: the sessions index, the first `cwd` in the first session
/// file, and finally the directory name with `-` turned back into `/`.
pub async fn read_project_path(project_dir: &Path) -> String {
    if let Some(path) = read_path_from_index(project_dir).await {
        return path;
    }

    if let Some(first) = list_session_files(project_dir).await.first()
        && let Some(cwd) = read_first_cwd(&first.path).await
    {
        return cwd;
    }

    let dir_name = project_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| project_dir.to_string_lossy().into_owned());
    dir_name_to_project_path(&dir_name)
}

/// Every project directory with its resolved display path
pub async fn list_project_dirs_with_paths(projects_root: &Path) -> Vec<ClaudeProjectDir> {
    let dirs = list_project_dirs(projects_root).await;
    join_all(dirs.into_iter().map(|dir| async move {
        let project_path = read_project_path(&dir).await;
        ClaudeProjectDir { dir, project_path }
    }))
    .await
}

/// Claude Code projects, most recently used first
pub async fn list_claude_projects(roots: &SourceRoots) -> Vec<ProjectMeta> {
    let dirs = list_project_dirs_with_paths(&roots.claude_projects_dir).await;

    let mut projects = join_all(dirs.into_iter().map(|project| async move {
        let sessions = list_session_files(&project.dir).await;
        let last_session_at = sessions.iter().filter_map(|s| s.last_modified_at).max();
        ProjectMeta {
            id: project.id(),
            source: Source::ClaudeCode,
            workspace_name: workspace_name(&project.project_path),
            workspace_path: project.project_path,
            last_session_at,
            session_count: sessions.len(),
        }
    }))
    .await;

    projects.sort_by(|a, b| b.last_session_at.cmp(&a.last_session_at));
    projects
}
