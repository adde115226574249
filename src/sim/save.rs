/// High-score persistence.
///
/// ## File format:
///   Key-value lines. Only `high_score=N` is read; unknown keys are ignored.
///
/// Stored as `highscore.dat` (name configurable) in the save directory.
/// All faults are soft: a bad read yields 0, a failed write is logged and
/// the in-memory value stays authoritative for the session.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

const HIGH_SCORE_KEY: &str = "high_score=";

// ══════════════════════════════════════════════════════════════
// Store
// ══════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("could not write {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },
    #[error("high score value {0:?} is not a number")]
    Malformed(String),
}

/// One integer, keyed. `Ok(None)` means nothing has been stored yet.
pub trait ScoreStore {
    fn load(&mut self) -> Result<Option<u32>, StoreError>;
    fn save(&mut self, score: u32) -> Result<(), StoreError>;
}

pub struct FileScoreStore {
    path: PathBuf,
}

impl FileScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileScoreStore { path: path.into() }
    }

    /// Store named `file_name` inside `save_dir()`.
    pub fn in_save_dir(file_name: &str) -> Self {
        FileScoreStore::new(save_dir().join(file_name))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoreStore for FileScoreStore {
    fn load(&mut self) -> Result<Option<u32>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .map_err(|source| StoreError::Read { path: self.path.clone(), source })?;
        parse_high_score(&content)
    }

    fn save(&mut self, score: u32) -> Result<(), StoreError> {
        std::fs::write(&self.path, format!("{}{}\n", HIGH_SCORE_KEY, score))
            .map_err(|source| StoreError::Write { path: self.path.clone(), source })
    }
}

fn parse_high_score(content: &str) -> Result<Option<u32>, StoreError> {
    for line in content.lines() {
        if let Some(val) = line.trim().strip_prefix(HIGH_SCORE_KEY) {
            let val = val.trim();
            return val
                .parse::<u32>()
                .map(Some)
                .map_err(|_| StoreError::Malformed(val.to_string()));
        }
    }
    Ok(None)
}

/// Save directory: exe dir if writable, else `~/.local/share/mazechase`,
/// else CWD.
pub fn save_dir() -> PathBuf {
    // 1. Exe directory (local/portable installs)
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            // System installs like /usr/games/ won't be writable
            let test_path = parent.join(".write_test_mazechase");
            if std::fs::write(&test_path, "").is_ok() {
                let _ = std::fs::remove_file(&test_path);
                return parent.to_path_buf();
            }
        }
    }

    // 2. XDG data home
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/mazechase");
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    // 3. CWD
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

// ══════════════════════════════════════════════════════════════
// Score board
// ══════════════════════════════════════════════════════════════

/// Current and best score, with the best mirrored to a `ScoreStore`.
pub struct ScoreBoard<S: ScoreStore> {
    store: S,
    current: u32,
    high: u32,
}

impl<S: ScoreStore> ScoreBoard<S> {
    pub fn new(mut store: S) -> Self {
        let high = match store.load() {
            Ok(Some(v)) => v,
            Ok(None) => 0,
            Err(e) => {
                warn!(error = %e, "high score unavailable, starting from 0");
                0
            }
        };
        ScoreBoard { store, current: 0, high }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn high(&self) -> u32 {
        self.high
    }

    pub fn update_current(&mut self, score: u32) {
        self.current = score;
    }

    /// Record the current score if it beats the best. Returns true exactly
    /// when the best strictly increased; the store is written immediately.
    pub fn check_new_high_score(&mut self) -> bool {
        if self.current <= self.high {
            return false;
        }
        self.high = self.current;
        info!(high_score = self.high, "new high score");
        if let Err(e) = self.store.save(self.high) {
            warn!(error = %e, "high score not persisted");
        }
        true
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }
}

/// In-memory store for tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryScoreStore {
    pub value: Option<u32>,
    pub writes: u32,
    pub fail_reads: bool,
    pub fail_writes: bool,
}

#[cfg(test)]
impl ScoreStore for MemoryScoreStore {
    fn load(&mut self) -> Result<Option<u32>, StoreError> {
        if self.fail_reads {
            return Err(StoreError::Malformed("NaN".into()));
        }
        Ok(self.value)
    }

    fn save(&mut self, score: u32) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Write {
                path: PathBuf::from("memory"),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        self.value = Some(score);
        self.writes += 1;
        Ok(())
    }
}
