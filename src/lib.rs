//! Agent History Search - Browse and search Codex and Claude Code conversation history
//!
//! This library reads the line-delimited JSON logs both assistant CLIs keep on
//! local disk (`~/.codex/sessions/` and `~/.claude/projects/`). It supports:
//!
//! - Reconstructing Codex logs into entries and user-initiated turns
//! - Validating Claude Code log lines against the closed set of known shapes
//! - Deriving session metadata (title, message count, cost) and caching the
//!   Codex history timestamps keyed on file modification time
//! - Case-insensitive substring search across both sources with context
//!   snippets, project and date filters, and pagination
//!
//! Project and session identifiers are base64url encodings of absolute paths.
//!
//! # Example
//!
//! ```no_run
//! use agent_history_search::{SearchRequest, SourceRoots, search};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let roots = SourceRoots::resolve(None, None)?;
//! let page = search(&roots, &SearchRequest::new("deploy").limit(10)).await?;
//! println!("{} matches", page.total);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod discovery;
pub mod metadata;
pub mod models;
pub mod parsers;
pub mod search;
pub mod utils;

// Re-export commonly used types
pub use config::SourceRoots;
pub use discovery::{list_all_project_paths, list_all_projects};
pub use metadata::{load_claude_session, load_codex_session};
pub use models::{ClaudeEntry, CodexSession, SearchPage, SearchRequest, SearchResult, Source};
pub use parsers::{parse_claude_session, parse_codex_session, parse_command_xml};
pub use search::{SearchError, search};
pub use utils::paths::{decode_id, dir_name_to_project_path, encode_id, format_path_with_tilde};
