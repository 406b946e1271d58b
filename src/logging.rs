//! Tracing subscriber setup.
//!
//! The TUI owns the terminal, so in that mode logs go to a file; text mode logs to stderr.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Default log location: `<data_local_dir>/spheron-yaml-cli/spheron-yaml.log`.
pub fn default_log_path() -> Result<PathBuf> {
    let dir = dirs::data_local_dir().context("could not determine local data directory")?;
    Ok(dir.join("spheron-yaml-cli").join("spheron-yaml.log"))
}

pub fn init_file(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter("info"))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| anyhow::anyhow!("install tracing subscriber: {e}"))
}

/// Stderr already carries the transcript in text mode, so only warnings show unless
/// `RUST_LOG` says otherwise.
pub fn init_stderr() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter("warn"))
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install tracing subscriber: {e}"))
}
