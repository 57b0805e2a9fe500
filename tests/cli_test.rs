/// CLI binary integration tests using assert_cmd
///
/// These tests invoke the actual binary and verify command-line behavior
mod common;

use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use common::{ClaudeEntryBuilder, CodexLogBuilder, SESSION_A, SourceTreeBuilder};
use predicates::prelude::*;

/// Command with HOME pointed at `home` and no root overrides inherited
fn cli(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_agent-history-search"));
    cmd.env("HOME", home).env_remove("CODEX_HOME").env_remove("CLAUDE_CONFIG_DIR").env_remove("RUST_LOG");
    cmd
}

fn populated_tree() -> SourceTreeBuilder {
    SourceTreeBuilder::new()
        .with_codex_session(
            "2024/01/01/rollout-1.jsonl",
            &CodexLogBuilder::new()
                .session_meta("abc", "/work/api", "2024-01-01T09:00:00Z")
                .user("deploy the api", "2024-01-01T09:00:01Z")
                .assistant("On it", "2024-01-01T09:00:02Z")
                .function_call_output("call_x", "stray", "2024-01-01T09:00:03Z"),
        )
        .with_claude_session(
            "/work/web",
            SESSION_A,
            &[ClaudeEntryBuilder::user("deploy the web app").cwd("/work/web").timestamp("2024-01-02T00:00:00Z")],
        )
}

#[test]
fn test_cli_stats_command_with_data() {
    let tree = populated_tree();

    cli(tree.home())
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Conversation History Statistics"))
        .stdout(predicate::str::contains("codex: 1 projects, 1 sessions"))
        .stdout(predicate::str::contains("claude-code: 1 projects, 1 sessions"));
}

#[test]
fn test_cli_stats_shows_latest_codex_prompt() {
    let tree = populated_tree().with_codex_history(
        "{\"session_id\":\"abc\",\"ts\":1704099600,\"text\":\"first prompt\"}\n{\"session_id\":\"abc\",\"ts\":1704099700,\"text\":\"ship the release\"}\n",
    );

    cli(tree.home())
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Latest Codex prompt: 2024-01-01 09:01:40 ship the release"))
        .stdout(predicate::str::contains("first prompt").not());
}

#[test]
fn test_cli_stats_with_missing_directories() {
    let temp_home = tempfile::TempDir::new().unwrap();

    cli(temp_home.path())
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("codex: 0 projects, 0 sessions"))
        .stdout(predicate::str::contains("claude-code: 0 projects, 0 sessions"))
        .stdout(predicate::str::contains("Latest Codex prompt").not());
}

#[test]
fn test_cli_no_command_shows_help_message() {
    let temp_home = tempfile::TempDir::new().unwrap();
    cli(temp_home.path()).assert().success().stdout(predicate::str::contains("Use --help for usage information"));
}

#[test]
fn test_cli_help_flag() {
    let temp_home = tempfile::TempDir::new().unwrap();
    cli(temp_home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Search through Codex and Claude Code conversation history"))
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("stats"));
}

#[test]
fn test_cli_version_flag() {
    let temp_home = tempfile::TempDir::new().unwrap();
    cli(temp_home.path()).arg("--version").assert().success().stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_cli_invalid_command() {
    let temp_home = tempfile::TempDir::new().unwrap();
    cli(temp_home.path()).arg("invalid-command").assert().failure();
}

#[test]
fn test_cli_search_text_output() {
    let tree = populated_tree();

    cli(tree.home())
        .args(["search", "DEPLOY"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 matches"))
        .stdout(predicate::str::contains("[deploy] the web app"))
        .stdout(predicate::str::contains("[codex]"));
}

#[test]
fn test_cli_search_json_with_filters() {
    let tree = populated_tree();

    let output = cli(tree.home())
        .args(["search", "deploy", "--source", "codex", "--since", "2024-01-01", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let page: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(page["total"], 1);
    assert_eq!(page["results"][0]["source"], "codex");
    assert_eq!(page["results"][0]["projectPath"], "/work/api");
    assert_eq!(page["results"][0]["role"], "user");
}

#[test]
fn test_cli_search_rejects_bad_input() {
    let temp_home = tempfile::TempDir::new().unwrap();

    cli(temp_home.path())
        .args(["search", "  "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("search query must not be empty"));
    cli(temp_home.path())
        .args(["search", "deploy", "--until", "yesterday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid date 'yesterday'"));
    cli(temp_home.path()).args(["search", "deploy", "--source", "gemini"]).assert().failure();
}

#[test]
fn test_cli_root_overrides() {
    let tree = populated_tree();
    let elsewhere = tempfile::TempDir::new().unwrap();

    cli(elsewhere.path())
        .arg("--codex-home")
        .arg(tree.codex_home())
        .arg("--claude-home")
        .arg(tree.claude_home())
        .args(["search", "deploy"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 matches"));
}

#[test]
fn test_cli_projects_json() {
    let tree = populated_tree();

    let output = cli(tree.home()).args(["projects", "--json"]).output().unwrap();
    assert!(output.status.success());

    let projects: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let paths: Vec<&str> =
        projects.as_array().unwrap().iter().filter_map(|p| p["workspacePath"].as_str()).collect();
    assert_eq!(paths.len(), 2);
    assert!(paths.contains(&"/work/api"));
    assert!(paths.contains(&"/work/web"));
}

#[test]
fn test_cli_session_codex_turns() {
    let tree = populated_tree();
    let log = tree.codex_home().join("sessions/2024/01/01/rollout-1.jsonl");

    cli(tree.home())
        .arg("session")
        .arg(&log)
        .args(["--source", "codex"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Turns: 1"))
        .stdout(predicate::str::contains("user: deploy the api"))
        .stdout(predicate::str::contains("tool (unknown): orphan result"));
}

#[test]
fn test_cli_session_claude_counts_invalid_lines() {
    let tree = populated_tree().with_claude_raw(
        "/work/other",
        SESSION_A,
        &format!("not json\n{}", ClaudeEntryBuilder::user("hello").to_json()),
    );
    let file = tree.claude_project_dir("/work/other").join(format!("{}.jsonl", SESSION_A));

    cli(tree.home())
        .arg("session")
        .arg(&file)
        .args(["--source", "claude-code"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Entries: 2"))
        .stdout(predicate::str::contains("Messages: 1"))
        .stdout(predicate::str::contains("Invalid lines: 1"));
}

#[test]
fn test_cli_session_missing_file_fails() {
    let temp_home = tempfile::TempDir::new().unwrap();

    cli(temp_home.path())
        .args(["session", "/nonexistent/log.jsonl", "--source", "codex"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read session file"));
}
