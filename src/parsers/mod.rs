//! Line-oriented parsers for Codex and Claude Code log files
//!
//! # Error Handling Strategy
//!
//! Parsers operate on text that has already been read into memory and never fail
//! as a whole:
//!
//! - **Codex logs**: lines that are not JSON are logged with `tracing` and skipped.
//!   Records of unknown kinds are ignored.
//!
//! - **Claude Code logs**: every non-empty line yields exactly one entry. Lines that
//!   are not JSON or match no known shape become error records carrying the raw
//!   line and its line number.
//!
//! - **History file**: malformed lines are logged and skipped.
//!
//! File-level I/O failures are handled by callers, which degrade to empty
//! results rather than surfacing an error.

pub mod claude;
pub mod codex;
pub mod command;
pub mod deserializers;
pub mod history;
pub mod text;

pub use claude::parse_claude_session;
pub use codex::parse_codex_session;
pub use command::parse_command_xml;
pub use history::{parse_history_timestamps, parse_latest_history_entry, read_latest_history_entry};
