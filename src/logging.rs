use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Mutex;

/// The terminal belongs to the UI, so logs go to a file instead.
pub fn log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join("timetable-tui").join("timetable-tui.log"))
}

pub fn init(level: tracing::Level) -> Result<PathBuf> {
    let path = log_path().with_context(|| "Could not determine cache directory for logs")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file at {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {e}"))?;

    Ok(path)
}
