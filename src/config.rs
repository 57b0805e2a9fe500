//! On-disk locations of the Codex and Claude Code histories

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::utils::{get_claude_dir, get_codex_dir};

/// Root directories and files every scan starts from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRoots {
    /// `<codex home>/sessions`, walked recursively for rollout logs
    pub codex_sessions_dir: PathBuf,
    /// `<codex home>/history.jsonl`
    pub codex_history_file: PathBuf,
    /// `<claude dir>/projects`, one directory per project
    pub claude_projects_dir: PathBuf,
}

impl SourceRoots {
    pub fn new(codex_home: &Path, claude_dir: &Path) -> Self {
        Self {
            codex_sessions_dir: codex_home.join("sessions"),
            codex_history_file: codex_home.join("history.jsonl"),
            claude_projects_dir: claude_dir.join("projects"),
        }
    }

    /// Roots from the environment, with optional explicit overrides
    pub fn resolve(codex_home: Option<PathBuf>, claude_dir: Option<PathBuf>) -> Result<Self> {
        let codex_home = match codex_home {
            Some(dir) => dir,
            None => get_codex_dir()?,
        };
        let claude_dir = match claude_dir {
            Some(dir) => dir,
            None => get_claude_dir()?,
        };
        Ok(Self::new(&codex_home, &claude_dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roots_layout() {
        let roots = SourceRoots::new(Path::new("/h/.codex"), Path::new("/h/.claude"));
        assert_eq!(roots.codex_sessions_dir, PathBuf::from("/h/.codex/sessions"));
        assert_eq!(roots.codex_history_file, PathBuf::from("/h/.codex/history.jsonl"));
        assert_eq!(roots.claude_projects_dir, PathBuf::from("/h/.claude/projects"));
    }

    #[test]
    fn test_explicit_overrides_skip_environment() {
        let roots =
            SourceRoots::resolve(Some(PathBuf::from("/a")), Some(PathBuf::from("/b"))).unwrap();
        assert_eq!(roots, SourceRoots::new(Path::new("/a"), Path::new("/b")));
    }
}
