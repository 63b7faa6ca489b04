//! Plume directory watcher
//!
//! Polls a detection directory for plume files matching the configured
//! pattern and feeds new ones through the pipeline. Processed paths are
//! remembered in a JSON state file keyed by modification time, so a
//! restarted watcher does not reprocess old files; `force` discards
//! that state.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};

use globset::{Glob, GlobSet, GlobSetBuilder};
use regex_lite::Regex;
use tracing::{error, info};
use walkdir::WalkDir;

use crate::pipeline::FlowPipeline;

/// Schema version for the watcher state file.
pub const STATE_SCHEMA_VERSION: u32 = 1;

/// Persisted watcher state.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct WatcherState {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Processed path (relative to the watch root) -> mtime seconds.
    #[serde(default)]
    pub processed: BTreeMap<String, i64>,
}

fn default_schema_version() -> u32 {
    STATE_SCHEMA_VERSION
}

impl Default for WatcherState {
    fn default() -> Self {
        Self {
            schema_version: STATE_SCHEMA_VERSION,
            processed: BTreeMap::new(),
        }
    }
}

impl WatcherState {
    pub fn load(path: &Path) -> Result<Self, WatcherError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| WatcherError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(WatcherError::State)
    }

    pub fn save(&self, path: &Path) -> Result<(), WatcherError> {
        let json = serde_json::to_string_pretty(self).map_err(WatcherError::State)?;
        fs::write(path, json).map_err(|source| WatcherError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Watcher errors.
#[derive(Debug, thiserror::Error)]
pub enum WatcherError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid watcher state: {0}")]
    State(#[from] serde_json::Error),

    #[error("invalid plume pattern: {0}")]
    Pattern(#[from] regex_lite::Error),

    #[error("invalid ignore pattern: {0}")]
    Ignore(#[from] globset::Error),
}

/// Watches a plume directory for new files matching a pattern.
pub struct DirWatcher {
    root: PathBuf,
    pattern: Regex,
    ignore: GlobSet,
    state: WatcherState,
    state_path: PathBuf,
}

impl DirWatcher {
    /// Create a watcher. `force` discards any previous state so every
    /// matching file is treated as new.
    pub fn new(
        root: PathBuf,
        pattern: &str,
        ignore_patterns: &[String],
        state_path: PathBuf,
        force: bool,
    ) -> Result<Self, WatcherError> {
        let pattern = Regex::new(pattern)?;

        let mut builder = GlobSetBuilder::new();
        for glob in ignore_patterns {
            builder.add(Glob::new(glob)?);
        }
        let ignore = builder.build()?;

        let state = if force {
            info!("force requested; discarding watcher state");
            WatcherState::default()
        } else {
            WatcherState::load(&state_path)?
        };

        Ok(Self {
            root,
            pattern,
            ignore,
            state,
            state_path,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files matching the pattern that have not been processed yet, in
    /// sorted order.
    pub fn scan(&self) -> Result<Vec<PathBuf>, WatcherError> {
        let mut new_files = Vec::new();

        for entry in WalkDir::new(&self.root).follow_links(false) {
            let entry = entry.map_err(|e| WatcherError::Io {
                path: self.root.clone(),
                source: e.into(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let rel = match entry.path().strip_prefix(&self.root) {
                Ok(rel) => rel_key(rel),
                Err(_) => continue,
            };

            if self.ignore.is_match(&rel) {
                continue;
            }
            if !self.pattern.is_match(&rel) {
                continue;
            }

            let mtime = mtime_seconds(entry.path()).unwrap_or(0);
            match self.state.processed.get(&rel) {
                Some(&seen) if seen >= mtime => continue,
                _ => new_files.push(entry.into_path()),
            }
        }

        new_files.sort();
        Ok(new_files)
    }

    /// Record a file as processed and persist the state.
    pub fn mark_processed(&mut self, path: &Path) -> Result<(), WatcherError> {
        let rel = path
            .strip_prefix(&self.root)
            .map(rel_key)
            .unwrap_or_else(|_| path.to_string_lossy().to_string());
        let mtime = mtime_seconds(path).unwrap_or(0);
        self.state.processed.insert(rel, mtime);
        self.state.save(&self.state_path)
    }

    /// Poll until `running` is cleared, feeding new files through the
    /// pipeline. A file that fails is still marked processed; it will
    /// be retried only if rewritten.
    pub fn watch(
        &mut self,
        pipeline: &mut FlowPipeline,
        poll_interval: Duration,
        running: Arc<AtomicBool>,
    ) -> Result<(), WatcherError> {
        info!(root = %self.root.display(), "watching for plume files");

        while running.load(Ordering::SeqCst) {
            let new_files = self.scan()?;
            if !new_files.is_empty() {
                info!(count = new_files.len(), "new plume files found");
            }

            for file in new_files {
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                if let Err(e) = pipeline.run(std::slice::from_ref(&file)) {
                    error!(file = %file.display(), error = %e, "processing failed");
                }
                self.mark_processed(&file)?;
            }

            sleep_responsive(poll_interval, &running);
        }

        info!("watcher stopped");
        Ok(())
    }
}

/// Relative paths are keyed with `/` separators regardless of platform
/// so state files are portable.
fn rel_key(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn mtime_seconds(path: &Path) -> Option<i64> {
    let modified = fs::metadata(path).ok()?.modified().ok()?;
    match modified.duration_since(UNIX_EPOCH) {
        Ok(d) => Some(d.as_secs() as i64),
        Err(_) => Some(0),
    }
}

/// Sleep in short slices so shutdown is honored promptly.
fn sleep_responsive(total: Duration, running: &Arc<AtomicBool>) {
    let slice = Duration::from_millis(250);
    let mut remaining = total;
    while !remaining.is_zero() && running.load(Ordering::SeqCst) {
        let step = remaining.min(slice);
        std::thread::sleep(step);
        remaining -= step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn watcher(dir: &TempDir, pattern: &str, force: bool) -> DirWatcher {
        DirWatcher::new(
            dir.path().join("plumes"),
            pattern,
            &["**/*.bak".to_string()],
            dir.path().join("state.json"),
            force,
        )
        .unwrap()
    }

    fn touch(root: &Path, rel: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "Candidate ID\nang-1\n").unwrap();
        path
    }

    #[test]
    fn test_scan_matches_pattern() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("plumes");
        touch(&root, "ang_detections/ime_minppmm1000/ang_a_ime_minppmm1000.csv");
        touch(&root, "unrelated.txt");

        let w = watcher(&dir, r"ang.*_ime_minppmm1000.*", false);
        let found = w.scan().unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].to_string_lossy().contains("ang_a"));
    }

    #[test]
    fn test_scan_honors_ignore_globs() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("plumes");
        touch(&root, "ang_ime_minppmm1000.csv");
        touch(&root, "ang_ime_minppmm1000.csv.bak");

        let w = watcher(&dir, r"ang.*", false);
        let found = w.scan().unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_mark_processed_persists() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("plumes");
        let file = touch(&root, "ang_ime_minppmm1000.csv");

        let mut w = watcher(&dir, r"ang.*", false);
        assert_eq!(w.scan().unwrap().len(), 1);
        w.mark_processed(&file).unwrap();
        assert!(w.scan().unwrap().is_empty());

        // A fresh watcher reloads the same state.
        let w2 = watcher(&dir, r"ang.*", false);
        assert!(w2.scan().unwrap().is_empty());
    }

    #[test]
    fn test_force_discards_state() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("plumes");
        let file = touch(&root, "ang_ime_minppmm1000.csv");

        let mut w = watcher(&dir, r"ang.*", false);
        w.mark_processed(&file).unwrap();

        let w_forced = watcher(&dir, r"ang.*", true);
        assert_eq!(w_forced.scan().unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let dir = TempDir::new().unwrap();
        let result = DirWatcher::new(
            dir.path().to_path_buf(),
            "ang(",
            &[],
            dir.path().join("state.json"),
            false,
        );
        assert!(matches!(result, Err(WatcherError::Pattern(_))));
    }

    #[test]
    fn test_state_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");

        let mut state = WatcherState::default();
        state.processed.insert("a/b.csv".to_string(), 1234);
        state.save(&path).unwrap();

        let loaded = WatcherState::load(&path).unwrap();
        assert_eq!(loaded.schema_version, STATE_SCHEMA_VERSION);
        assert_eq!(loaded.processed.get("a/b.csv"), Some(&1234));
    }
}
