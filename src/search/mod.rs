//! Cross-source substring search
//!
//! - [`snippet`] locates a match and cuts its context window
//! - [`extract`] decides which text of each entry is searchable
//! - [`filter`] holds the date range and project path filters
//! - [`engine`] scans both sources and assembles the result page

pub mod engine;
pub mod extract;
pub mod filter;
pub mod snippet;

use thiserror::Error;

pub use engine::search;
pub use filter::{DateRange, project_matches};
pub use snippet::{CONTEXT_CHARS, Snippet, find_snippet};

/// Invalid search requests
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("search query must not be empty")]
    EmptyQuery,
    #[error("invalid date '{value}': expected YYYY-MM-DD or an RFC 3339 timestamp")]
    InvalidDate { value: String },
}
