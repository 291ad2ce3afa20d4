//! Tracing subscriber setup
//!
//! The terminal UI draws on stderr, so in chat mode log lines go to a file instead.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub type InitError = Box<dyn std::error::Error + Send + Sync>;

/// Filter from `RUST_LOG`, defaulting to `info`
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Log to stderr
pub fn init_stderr() -> Result<(), InitError> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
}

/// Append log lines to `path`, creating parent directories as needed
pub fn init_file(path: &Path) -> Result<(), InitError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
}

/// `<data_local_dir>/triagem/triagem.log`, or `triagem.log` in the working
/// directory when the platform has no data directory
pub fn default_log_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("triagem"))
        .unwrap_or_default()
        .join("triagem.log")
}
