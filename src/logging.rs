//! Tracing setup: a daily-rolling log file so the TUI never writes to the
//! terminal it is drawing on.

use std::{env, path::PathBuf};

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Where log files go: `$XDG_DATA_HOME/encore/logs` or
/// `~/.local/share/encore/logs`.
fn log_dir() -> Option<PathBuf> {
    let data_home = if let Some(xdg) = env::var_os("XDG_DATA_HOME") {
        Some(PathBuf::from(xdg))
    } else if let Some(home) = env::var_os("HOME") {
        Some(PathBuf::from(home).join(".local").join("share"))
    } else {
        None
    };

    data_home.map(|d| d.join("encore").join("logs"))
}

/// Initialize the global subscriber. The returned guard must be kept alive
/// for the lifetime of the process or buffered lines are lost on exit.
pub fn init() -> anyhow::Result<WorkerGuard> {
    let dir = log_dir().context("cannot determine a log directory (no HOME)")?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(&dir, "encore.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,encore=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}
