//! CLI for urlcount.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use urlcount_core::config::{self, UrlCountConfig};
use urlcount_core::logging;

use commands::{run_count, run_show_config};

/// Top-level CLI: reads URLs (one per line) and counts a word in each page.
#[derive(Debug, Parser)]
#[command(name = "urlcount")]
#[command(about = "Count a word across many URLs with a bounded pool of workers", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<CliCommand>,

    // Options for the default `run` command when no subcommand is given.
    #[command(flatten)]
    pub run: RunArgs,

    /// Load configuration from this file instead of ~/.config/urlcount/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write logs to ~/.local/state/urlcount/urlcount.log instead of stderr.
    #[arg(long, global = true)]
    pub log_file: bool,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Read URLs from stdin (or --input), fetch them concurrently and print counts.
    Run(RunArgs),

    /// Print the effective configuration as TOML.
    ShowConfig,
}

#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    /// Number of concurrent workers (default 5, or `workers` from the config file).
    #[arg(short = 'k', long = "workers", value_name = "N")]
    pub workers: Option<usize>,

    /// Word to count (default "Go", or `target_word` from the config file).
    #[arg(long, value_name = "WORD")]
    pub word: Option<String>,

    /// Read URLs from this file instead of stdin.
    #[arg(long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Total timeout per fetch in seconds (default: none).
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl RunArgs {
    /// Overlay command-line values on top of the loaded configuration.
    pub fn apply(&self, cfg: &mut UrlCountConfig) {
        if let Some(workers) = self.workers {
            cfg.workers = workers;
        }
        if let Some(word) = &self.word {
            cfg.target_word = word.clone();
        }
        if let Some(secs) = self.timeout {
            cfg.timeout_secs = Some(secs);
        }
    }
}

impl Cli {
    /// Set up logging as requested on the command line. Falls back to stderr if the
    /// log file cannot be opened.
    pub fn init_logging(&self) {
        if self.log_file {
            if let Err(e) = logging::init_logging() {
                logging::init_logging_stderr();
                tracing::warn!("log file unavailable ({:#}); logging to stderr", e);
            }
        } else {
            logging::init_logging_stderr();
        }
    }

    pub async fn dispatch(self) -> Result<()> {
        let cfg = load_config(self.config.as_deref())?;
        tracing::debug!("loaded config: {:?}", cfg);

        match self.command {
            Some(CliCommand::Run(args)) => run_count(cfg, &args).await?,
            Some(CliCommand::ShowConfig) => run_show_config(&cfg)?,
            None => run_count(cfg, &self.run).await?,
        }

        Ok(())
    }
}

/// Explicit `--config` must load; the default XDG file is created on first use,
/// and built-in defaults are used if that location is unusable.
fn load_config(path: Option<&std::path::Path>) -> Result<UrlCountConfig> {
    match path {
        Some(path) => config::load_from_path(path),
        None => match config::load_or_init() {
            Ok(cfg) => Ok(cfg),
            Err(e) => {
                tracing::warn!("using built-in defaults; config unavailable: {:#}", e);
                Ok(UrlCountConfig::default())
            }
        },
    }
}

#[cfg(test)]
mod tests;
