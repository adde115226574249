/// Structured logging to a file.
///
/// The terminal is in raw alternate-screen mode while the game runs, so
/// log lines go to `<save dir>/<log_file>` instead of stderr. Filter comes
/// from `RUST_LOG`, default `info`.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("could not open log file {path}: {source}")]
    Open { path: PathBuf, source: std::io::Error },
    #[error("could not install log subscriber: {0}")]
    Install(String),
}

pub fn init(path: &Path) -> Result<(), LogError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LogError::Open { path: path.to_path_buf(), source })?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| LogError::Install(e.to_string()))
}
