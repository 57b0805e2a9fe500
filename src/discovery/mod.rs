//! Locating sessions and projects on disk for both sources
//!
//! - [`codex`] walks the Codex sessions tree and reads session headers
//! - [`claude`] lists Claude Code project directories and their session files
//!
//! Missing roots and unreadable files are not errors: the affected source
//! simply contributes nothing.

pub mod claude;
pub mod codex;

use std::collections::{BTreeMap, BTreeSet};

use crate::config::SourceRoots;
use crate::models::{ProjectMeta, ProjectPathEntry, Source};
use crate::utils::trim_trailing_slash;

pub use claude::{
    ClaudeProjectDir, ClaudeSessionFile, is_session_file_name, list_claude_projects,
    list_project_dirs_with_paths, list_session_files, read_project_path,
};
pub use codex::{
    CodexSessionHeader, CodexSessionRecord, list_codex_projects, list_codex_session_files,
    list_codex_sessions, read_session_header,
};

/// Projects of both sources, most recently used first
pub async fn list_all_projects(roots: &SourceRoots) -> Vec<ProjectMeta> {
    let (codex, claude) = futures::join!(list_codex_projects(roots), list_claude_projects(roots));
    let mut projects: Vec<ProjectMeta> = codex.into_iter().chain(claude).collect();
    projects.sort_by(|a, b| b.last_session_at.cmp(&a.last_session_at));
    projects
}

/// Merge project listings into unique display paths with the sources each appears in
pub fn merge_project_paths(projects: &[ProjectMeta]) -> Vec<ProjectPathEntry> {
    let mut by_path: BTreeMap<String, BTreeSet<Source>> = BTreeMap::new();
    for project in projects {
        by_path
            .entry(trim_trailing_slash(&project.workspace_path).to_string())
            .or_default()
            .insert(project.source);
    }
    by_path.into_iter().map(|(path, sources)| ProjectPathEntry { path, sources }).collect()
}

/// Every distinct project path across both sources, in path order
pub async fn list_all_project_paths(roots: &SourceRoots) -> Vec<ProjectPathEntry> {
    merge_project_paths(&list_all_projects(roots).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(path: &str, source: Source) -> ProjectMeta {
        ProjectMeta {
            id: String::new(),
            source,
            workspace_name: String::new(),
            workspace_path: path.to_string(),
            last_session_at: None,
            session_count: 1,
        }
    }

    #[test]
    fn test_merge_project_paths() {
        let merged = merge_project_paths(&[
            project("/work/app", Source::Codex),
            project("/work/app/", Source::ClaudeCode),
            project("/work/lib", Source::ClaudeCode),
        ]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].path, "/work/app");
        assert_eq!(merged[0].sources, BTreeSet::from([Source::Codex, Source::ClaudeCode]));
        assert_eq!(merged[1].sources, BTreeSet::from([Source::ClaudeCode]));
    }
}
