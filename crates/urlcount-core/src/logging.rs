//! Logging init: stderr by default, or a file under the XDG state dir.

use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Default filter for the log file: verbose for our own crates.
const FILE_FILTER: &str = "info,urlcount=debug,urlcount_core=debug";
/// Default filter for stderr, where logs share the terminal with results.
const STDERR_FILTER: &str = "info";

/// Filter used when `RUST_LOG` is unset.
pub fn default_filter(to_file: bool) -> &'static str {
    if to_file {
        FILE_FILTER
    } else {
        STDERR_FILTER
    }
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Path of the log file used by [`init_logging`].
pub fn log_file_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("urlcount")?;
    Ok(xdg_dirs.place_state_file("urlcount.log")?)
}

/// Initialize structured logging to `~/.local/state/urlcount/urlcount.log`.
/// On failure (e.g. log dir unwritable), returns Err so the caller can fall back to stderr.
pub fn init_logging() -> Result<()> {
    let log_file_path = log_file_path()?;
    if let Some(dir) = log_file_path.parent() {
        fs::create_dir_all(dir)?;
    }

    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_filter(true)))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    tracing::info!("urlcount logging initialized at {}", log_file_path.display());

    Ok(())
}

/// Initialize logging to stderr only, so fetch failures interleave with results on the terminal.
pub fn init_logging_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_filter(false)))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
