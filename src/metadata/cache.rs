//! Modification-time keyed cache of Codex history timestamps
//!
//! The history file is append-only and can grow large, so the parsed
//! `session id -> newest timestamp` map is kept per path and reused while the
//! file's modification time is unchanged. Readers always receive their own copy.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, PoisonError, RwLock};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::parsers::parse_history_timestamps;

pub type HistoryTimestamps = HashMap<String, DateTime<Utc>>;

/// Filesystem access used by the cache
pub trait FileStat: Send + Sync {
    /// Modification time, `None` when the file does not exist
    fn modified(&self, path: &Path) -> io::Result<Option<SystemTime>>;

    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// [`FileStat`] backed by the real filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct FsStat;

impl FileStat for FsStat {
    fn modified(&self, path: &Path) -> io::Result<Option<SystemTime>> {
        match std::fs::metadata(path) {
            Ok(metadata) => metadata.modified().map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

#[derive(Debug, Clone)]
struct CachedTimestamps {
    mtime: SystemTime,
    timestamps: HistoryTimestamps,
}

#[derive(Debug, Default)]
pub struct HistoryTimestampCache<S = FsStat> {
    stat: S,
    entries: RwLock<HashMap<PathBuf, CachedTimestamps>>,
}

impl HistoryTimestampCache<FsStat> {
    pub fn new() -> Self {
        Self::with_stat(FsStat)
    }
}

impl<S: FileStat> HistoryTimestampCache<S> {
    pub fn with_stat(stat: S) -> Self {
        Self { stat, entries: RwLock::new(HashMap::new()) }
    }

    /// Newest timestamp per session id recorded in the history file at `path`.
    ///
    /// Returns the cached map while the file's modification time is unchanged,
    /// otherwise re-scans the file and replaces the cached entry. A missing file
    /// clears the entry and yields an empty map.
    pub fn timestamps(&self, path: &Path) -> HistoryTimestamps {
        let mtime = match self.stat.modified(path) {
            Ok(Some(mtime)) => mtime,
            Ok(None) => {
                self.invalidate(path);
                return HistoryTimestamps::new();
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to stat history file");
                return HistoryTimestamps::new();
            }
        };

        if let Some(cached) = self.lookup(path, mtime) {
            debug!(path = %path.display(), "History timestamps served from cache");
            return cached;
        }

        let content = match self.stat.read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read history file");
                return HistoryTimestamps::new();
            }
        };
        let timestamps = parse_history_timestamps(&content);

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(path.to_path_buf(), CachedTimestamps { mtime, timestamps: timestamps.clone() });
        timestamps
    }

    pub fn invalidate(&self, path: &Path) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(path);
    }

    pub fn is_cached(&self, path: &Path) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.contains_key(path)
    }

    fn lookup(&self, path: &Path, mtime: SystemTime) -> Option<HistoryTimestamps> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(path).filter(|cached| cached.mtime == mtime).map(|cached| cached.timestamps.clone())
    }
}

static GLOBAL_CACHE: LazyLock<HistoryTimestampCache> = LazyLock::new(HistoryTimestampCache::new);

/// Process-wide cached lookup of history timestamps
pub fn history_timestamps(path: &Path) -> HistoryTimestamps {
    GLOBAL_CACHE.timestamps(path)
}

/// [`history_timestamps`] run on the blocking thread pool
pub async fn load_history_timestamps(path: PathBuf) -> HistoryTimestamps {
    match tokio::task::spawn_blocking(move || history_timestamps(&path)).await {
        Ok(timestamps) => timestamps,
        Err(e) => {
            warn!(error = %e, "History timestamp task failed");
            HistoryTimestamps::new()
        }
    }
}
