use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::pin::pin;

use futures::stream::{self, Stream, StreamExt};
use tracing::{debug, info};

use super::extract::{SearchableText, claude_text, codex_texts};
use super::filter::{DateRange, project_matches};
use super::snippet::find_snippet;
use super::SearchError;
use crate::config::SourceRoots;
use crate::discovery::claude::{ClaudeProjectDir, list_project_dirs, list_session_files, read_project_path};
use crate::discovery::codex::{list_codex_session_files, parse_session_header};
use crate::models::{SearchPage, SearchRequest, SearchResult, Source};
use crate::parsers::{parse_claude_session, parse_codex_session};
use crate::utils::encode_id;

/// Session files read ahead concurrently within one source scan
const FILE_CONCURRENCY: usize = 8;
/// Project directories resolved ahead concurrently in the Claude Code scan
const PROJECT_CONCURRENCY: usize = 4;

/// Where matches of one session file are attributed
struct SessionContext {
    source: Source,
    project_id: String,
    project_path: String,
    session_id: String,
}

/// Per-source accumulator that stops accepting matches at the cutoff
struct Matches<'q> {
    query: &'q str,
    cutoff: usize,
    results: Vec<SearchResult>,
}

impl<'q> Matches<'q> {
    fn new(query: &'q str, cutoff: usize) -> Self {
        Self { query, cutoff, results: Vec::new() }
    }

    fn is_full(&self) -> bool {
        self.results.len() >= self.cutoff
    }

    fn scan<'a>(&mut self, context: &SessionContext, texts: impl IntoIterator<Item = SearchableText<'a>>) {
        for candidate in texts {
            if self.is_full() {
                break;
            }
            let Some(snippet) = find_snippet(&candidate.text, self.query) else {
                continue;
            };
            self.results.push(SearchResult {
                source: context.source,
                project_id: context.project_id.clone(),
                project_path: context.project_path.clone(),
                session_id: context.session_id.clone(),
                matched_text: snippet.matched.to_string(),
                context_before: snippet.before.to_string(),
                context_after: snippet.after.to_string(),
                timestamp: candidate.timestamp,
                role: candidate.role,
            });
        }
    }
}

/// File contents in input order, read concurrently a few files ahead.
/// Unreadable files are skipped.
fn read_in_order(paths: Vec<PathBuf>) -> impl Stream<Item = (PathBuf, String)> {
    stream::iter(paths)
        .map(|path| async move {
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => Some((path, content)),
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "Skipping unreadable session file");
                    None
                }
            }
        })
        .buffered(FILE_CONCURRENCY)
        .filter_map(|item| async move { item })
}

/// Workspace path from a Codex log's first line
fn codex_workspace(content: &str) -> Option<String> {
    parse_session_header(content.lines().next()?)?.workspace_path
}

async fn search_codex(sessions_root: &Path, query: &str, project_filter: Option<&str>, cutoff: usize) -> Vec<SearchResult> {
    let mut matches = Matches::new(query, cutoff);
    if matches.is_full() {
        return matches.results;
    }

    let files = list_codex_session_files(sessions_root).await;
    let mut contents = pin!(read_in_order(files));

    while let Some((path, content)) = contents.next().await {
        // The session's working directory, else the directory holding the log
        let (project_path, project_key) = match codex_workspace(&content) {
            Some(cwd) => (cwd.clone(), cwd),
            None => {
                let parent = path.parent().unwrap_or(&path).to_string_lossy().into_owned();
                (parent.clone(), parent)
            }
        };
        if !project_matches(project_filter, &project_path) {
            continue;
        }

        let session = parse_codex_session(&content);
        let context = SessionContext {
            source: Source::Codex,
            project_id: encode_id(&project_key),
            project_path,
            session_id: encode_id(&path.to_string_lossy()),
        };
        matches.scan(&context, codex_texts(&session));
        if matches.is_full() {
            break;
        }
    }

    matches.results
}

async fn resolve_project(dir: PathBuf) -> ClaudeProjectDir {
    let project_path = read_project_path(&dir).await;
    ClaudeProjectDir { dir, project_path }
}

async fn search_claude(projects_root: &Path, query: &str, project_filter: Option<&str>, cutoff: usize) -> Vec<SearchResult> {
    let mut matches = Matches::new(query, cutoff);
    if matches.is_full() {
        return matches.results;
    }

    let dirs = list_project_dirs(projects_root).await;
    let mut projects = pin!(stream::iter(dirs).map(resolve_project).buffered(PROJECT_CONCURRENCY));

    'projects: while let Some(project) = projects.next().await {
        if !project_matches(project_filter, &project.project_path) {
            continue;
        }

        let sessions = list_session_files(&project.dir).await;
        let project_id = project.id();
        let mut contents = pin!(read_in_order(sessions.into_iter().map(|s| s.path).collect()));

        while let Some((path, content)) = contents.next().await {
            let session_id = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            let context = SessionContext {
                source: Source::ClaudeCode,
                project_id: project_id.clone(),
                project_path: project.project_path.clone(),
                session_id,
            };
            let entries = parse_claude_session(&content);
            matches.scan(&context, entries.iter().filter_map(claude_text));
            if matches.is_full() {
                break 'projects;
            }
        }
    }

    matches.results
}

/// Newest first; results without a timestamp go last, otherwise order is kept
fn by_recency(a: &SearchResult, b: &SearchResult) -> Ordering {
    match (a.timestamp, b.timestamp) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Case-insensitive substring search across the enabled sources.
///
/// Each source scan runs concurrently and stops once it holds `limit + offset`
/// matches of its own. The merged matches are filtered by date, sorted newest
/// first, and the requested page is returned with the filtered total.
///
/// # Errors
///
/// Returns [`SearchError::EmptyQuery`] for a blank query and
/// [`SearchError::InvalidDate`] for an unparsable date bound.
pub async fn search(roots: &SourceRoots, request: &SearchRequest) -> Result<SearchPage, SearchError> {
    if request.query.trim().is_empty() {
        return Err(SearchError::EmptyQuery);
    }
    let dates = DateRange::parse(request.start_date.as_deref(), request.end_date.as_deref())?;
    let cutoff = request.limit.saturating_add(request.offset);
    let query = request.query.as_str();
    let project_filter = request.project_path.as_deref();

    let codex = async {
        if request.sources.contains(&Source::Codex) {
            search_codex(&roots.codex_sessions_dir, query, project_filter, cutoff).await
        } else {
            Vec::new()
        }
    };
    let claude = async {
        if request.sources.contains(&Source::ClaudeCode) {
            search_claude(&roots.claude_projects_dir, query, project_filter, cutoff).await
        } else {
            Vec::new()
        }
    };
    let (codex, claude) = futures::join!(codex, claude);
    debug!(codex = codex.len(), claude = claude.len(), "Source scans finished");

    let mut results: Vec<SearchResult> =
        codex.into_iter().chain(claude).filter(|result| dates.contains(result.timestamp)).collect();
    results.sort_by(by_recency);

    let total = results.len();
    let results = results.into_iter().skip(request.offset).take(request.limit).collect();
    info!(query, total, "Search completed");

    Ok(SearchPage { results, total })
}
