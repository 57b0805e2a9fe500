//! Session metadata: derived summaries, session loading, and the
//! modification-time keyed history timestamp cache.

pub mod cache;
pub mod detail;
pub mod session;

pub use cache::{
    FileStat, FsStat, HistoryTimestampCache, HistoryTimestamps, history_timestamps,
    load_history_timestamps,
};
pub use detail::{load_claude_session, load_codex_session};
pub use session::{
    FileTimes, calculate_session_cost, claude_session_summary, codex_session_summary,
    first_user_text,
};
