use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Overrides the Codex home directory (default `~/.codex`)
pub const CODEX_HOME_ENV: &str = "CODEX_HOME";
/// Overrides the Claude Code config directory (default `~/.claude`)
pub const CLAUDE_CONFIG_DIR_ENV: &str = "CLAUDE_CONFIG_DIR";

fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().context("Failed to resolve home directory")
}

/// Resolve a directory from an environment variable, falling back to `~/<default_name>`
fn dir_from_env(var: Option<String>, default_name: &str) -> Result<PathBuf> {
    match var.filter(|value| !value.trim().is_empty()) {
        Some(value) => Ok(PathBuf::from(value)),
        None => Ok(home_dir()?.join(default_name)),
    }
}

/// Get the Codex directory path (`$CODEX_HOME` or `~/.codex`)
pub fn get_codex_dir() -> Result<PathBuf> {
    dir_from_env(env::var(CODEX_HOME_ENV).ok(), ".codex")
}

/// Get the Claude directory path (`$CLAUDE_CONFIG_DIR` or `~/.claude`)
pub fn get_claude_dir() -> Result<PathBuf> {
    dir_from_env(env::var(CLAUDE_CONFIG_DIR_ENV).ok(), ".claude")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_value_wins() {
        let dir = dir_from_env(Some("/srv/codex".to_string()), ".codex").unwrap();
        assert_eq!(dir, PathBuf::from("/srv/codex"));
    }

    #[test]
    fn test_blank_env_value_falls_back_to_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let dir = dir_from_env(Some("  ".to_string()), ".claude").unwrap();
        assert_eq!(dir, home.join(".claude"));
    }

    #[test]
    fn test_missing_env_value_falls_back_to_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(dir_from_env(None, ".codex").unwrap(), home.join(".codex"));
    }
}
