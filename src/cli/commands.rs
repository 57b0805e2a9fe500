use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::warn;

use crate::config::SourceRoots;
use crate::discovery::{list_all_projects, list_claude_projects, list_codex_projects};
use crate::metadata::{FileTimes, claude_session_summary, codex_session_summary};
use crate::models::{ClaudeEntry, CodexSession, DEFAULT_SEARCH_LIMIT, SearchPage, SearchRequest, Source};
use crate::parsers::{parse_claude_session, parse_codex_session, read_latest_history_entry};
use crate::search::search;
use crate::utils::{format_path_with_tilde, single_line};

/// Longest message preview printed per line in text output
const PREVIEW_CHARS: usize = 120;

#[derive(Parser)]
#[command(name = "agent-history-search")]
#[command(version = "0.1.0")]
#[command(about = "Search through Codex and Claude Code conversation history", long_about = None)]
pub struct Cli {
    /// Codex home directory (defaults to $CODEX_HOME or ~/.codex)
    #[arg(long, global = true, value_name = "DIR")]
    pub codex_home: Option<PathBuf>,

    /// Claude Code config directory (defaults to $CLAUDE_CONFIG_DIR or ~/.claude)
    #[arg(long, global = true, value_name = "DIR")]
    pub claude_home: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Case-insensitive substring search across both histories
    Search(SearchArgs),
    /// List projects of both sources, most recent first
    Projects {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Parse one session log and print its contents
    Session {
        /// Path to the session log
        file: PathBuf,
        /// Which tool wrote the log
        #[arg(long, value_name = "SOURCE")]
        source: Source,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show statistics about the history
    Stats,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Text to look for
    pub query: String,

    /// Restrict to one or more sources (codex, claude-code)
    #[arg(long = "source", value_name = "SOURCE")]
    pub sources: Vec<Source>,

    #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
    pub limit: usize,

    #[arg(long, default_value_t = 0)]
    pub offset: usize,

    /// Only search sessions of this project path
    #[arg(long, value_name = "PATH")]
    pub project: Option<String>,

    /// Earliest date to include (YYYY-MM-DD or RFC 3339)
    #[arg(long, value_name = "DATE")]
    pub since: Option<String>,

    /// Latest date to include, through the end of that day
    #[arg(long, value_name = "DATE")]
    pub until: Option<String>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl SearchArgs {
    fn to_request(&self) -> SearchRequest {
        let sources = if self.sources.is_empty() { Source::ALL.to_vec() } else { self.sources.clone() };
        let mut request = SearchRequest::new(self.query.clone())
            .sources(sources)
            .limit(self.limit)
            .offset(self.offset)
            .date_range(self.since.as_deref(), self.until.as_deref());
        if let Some(project) = &self.project {
            request = request.project_path(project.clone());
        }
        request
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let Some(command) = &cli.command else {
        println!("Use --help for usage information");
        return Ok(());
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let roots = SourceRoots::resolve(cli.codex_home.clone(), cli.claude_home.clone())?;

    runtime.block_on(async {
        match command {
            Commands::Search(args) => run_search(&roots, args).await,
            Commands::Projects { json } => show_projects(&roots, *json).await,
            Commands::Session { file, source, json } => show_session(file, *source, *json).await,
            Commands::Stats => show_stats(&roots).await,
        }
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("Failed to serialize output")?);
    Ok(())
}

fn preview(text: &str) -> String {
    let line = single_line(text);
    match line.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &line[..cut]),
        None => line,
    }
}

fn format_time(timestamp: Option<DateTime<Utc>>) -> String {
    timestamp.map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string()).unwrap_or_else(|| "-".to_string())
}

async fn run_search(roots: &SourceRoots, args: &SearchArgs) -> Result<()> {
    let page: SearchPage = search(roots, &args.to_request()).await?;
    if args.json {
        return print_json(&page);
    }

    println!("{} matches", page.total);
    for result in &page.results {
        println!();
        println!(
            "[{}] {} {} ({})",
            result.source,
            format_time(result.timestamp),
            single_line(&format_path_with_tilde(Path::new(&result.project_path))),
            result.role
        );
        println!(
            "  {}",
            preview(&format!("{}[{}]{}", result.context_before, result.matched_text, result.context_after))
        );
    }
    Ok(())
}

async fn show_projects(roots: &SourceRoots, json: bool) -> Result<()> {
    let projects = list_all_projects(roots).await;
    if json {
        return print_json(&projects);
    }

    for project in &projects {
        println!(
            "{:<12} {:>5} sessions  {}  {}",
            project.source,
            project.session_count,
            format_time(project.last_session_at),
            single_line(&format_path_with_tilde(Path::new(&project.workspace_path)))
        );
    }
    Ok(())
}

async fn show_session(file: &Path, source: Source, json: bool) -> Result<()> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read session file: {}", file.display()))?;
    let times = match tokio::fs::metadata(file).await {
        Ok(metadata) => FileTimes::from_metadata(&metadata),
        Err(_) => FileTimes::default(),
    };

    match source {
        Source::Codex => {
            let session = parse_codex_session(&content);
            if json {
                return print_json(&session);
            }
            print_codex_session(&session, times);
        }
        Source::ClaudeCode => {
            let entries = parse_claude_session(&content);
            if json {
                return print_json(&entries);
            }
            print_claude_session(&entries);
        }
    }
    Ok(())
}

fn print_codex_session(session: &CodexSession, times: FileTimes) {
    let summary = codex_session_summary(session, times);
    if let Some(cwd) = &session.session_meta.cwd {
        println!("Workspace: {}", single_line(&format_path_with_tilde(Path::new(cwd))));
    }
    if let Some(command) = &summary.first_command {
        println!("Title: {}", preview(&command.title()));
    }
    println!("Started: {}", format_time(summary.started_at));
    println!("Entries: {}  Turns: {}", summary.message_count, session.turns.len());

    for (index, turn) in session.turns.iter().enumerate() {
        println!();
        println!("Turn {}", index + 1);
        if let Some(user) = &turn.user_message {
            println!("  user: {}", preview(&user.text));
        }
        for message in &turn.assistant_messages {
            println!("  assistant: {}", preview(&message.text));
        }
        for pair in turn.tool_pairs() {
            let status = match (&pair.result, pair.orphan) {
                (_, true) => "orphan result",
                (Some(_), false) => "ok",
                (None, false) => "no result",
            };
            println!("  tool {}: {}", single_line(&pair.call.name), status);
        }
    }
}

fn print_claude_session(entries: &[ClaudeEntry]) {
    let summary = claude_session_summary(entries);
    let errors = entries.iter().filter(|e| e.is_error()).count();

    if let Some(title) = summary.title() {
        println!("Title: {}", preview(&title));
    }
    if let Some(model) = &summary.model_name {
        println!("Model: {}", single_line(model));
    }
    println!("Entries: {}", entries.len());
    println!("  Messages: {}", summary.message_count);
    println!("  Invalid lines: {}", errors);
    println!("Estimated cost: ${:.4}", summary.cost.total_usd);
    let usage = summary.cost.token_usage;
    println!(
        "Tokens: {} in, {} out, {} cache write, {} cache read",
        usage.input_tokens, usage.output_tokens, usage.cache_creation_tokens, usage.cache_read_tokens
    );
}

async fn show_stats(roots: &SourceRoots) -> Result<()> {
    let (codex, claude, latest_prompt) = futures::join!(
        list_codex_projects(roots),
        list_claude_projects(roots),
        read_latest_history_entry(&roots.codex_history_file)
    );

    println!("Conversation History Statistics");
    println!("===============================");
    for (source, projects) in [(Source::Codex, &codex), (Source::ClaudeCode, &claude)] {
        let sessions: usize = projects.iter().map(|p| p.session_count).sum();
        let newest = projects.iter().filter_map(|p| p.last_session_at).max();
        println!("{}: {} projects, {} sessions", source, projects.len(), sessions);
        println!("  Latest session: {}", format_time(newest));
    }
    let latest_prompt = latest_prompt.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to read Codex history");
        None
    });
    if let Some(entry) = latest_prompt {
        println!(
            "Latest Codex prompt: {} {}",
            format_time(entry.timestamp),
            preview(entry.text.as_deref().unwrap_or_default())
        );
    }
    println!();
    println!("Codex sessions: {}", format_path_with_tilde(&roots.codex_sessions_dir));
    println!("Claude Code projects: {}", format_path_with_tilde(&roots.claude_projects_dir));

    Ok(())
}
