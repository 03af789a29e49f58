//! `urlcount run` – count the target word across URLs read from stdin or a file.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, Write};
use std::sync::Arc;
use urlcount_core::config::UrlCountConfig;
use urlcount_core::fetch::{CurlCounter, WordCounter};
use urlcount_core::pipeline::{run_pipeline, RunSummary};
use urlcount_core::pool::JobResult;

use crate::cli::RunArgs;

pub(crate) fn write_result(out: &mut impl Write, result: &JobResult) -> io::Result<()> {
    writeln!(out, "Count for {}: {}", result.url, result.count)
}

pub(crate) fn write_total(out: &mut impl Write, total: u64) -> io::Result<()> {
    writeln!(out, "Total: {}", total)
}

pub async fn run_count(mut cfg: UrlCountConfig, args: &RunArgs) -> Result<()> {
    args.apply(&mut cfg);
    cfg.validate().context("invalid configuration")?;

    let counter: Arc<dyn WordCounter> = Arc::new(CurlCounter::from_config(&cfg));
    let input = args.input.clone();

    let summary = tokio::task::spawn_blocking(move || -> Result<RunSummary> {
        let report = |result: &JobResult| {
            let mut out = io::stdout().lock();
            if let Err(e) = write_result(&mut out, result) {
                tracing::warn!("could not write result for {}: {}", result.url, e);
            }
        };
        match input {
            Some(path) => {
                let file = File::open(&path)
                    .with_context(|| format!("open input {}", path.display()))?;
                run_pipeline(file, &cfg, counter, report)
            }
            None => run_pipeline(io::stdin(), &cfg, counter, report),
        }
    })
    .await
    .context("count task join")??;

    write_total(&mut io::stdout().lock(), summary.tally.total)?;

    if summary.pool.failed > 0 {
        tracing::info!(
            "{} of {} URL(s) failed; see log for details",
            summary.pool.failed,
            summary.pool.dispatched
        );
    }
    Ok(())
}
