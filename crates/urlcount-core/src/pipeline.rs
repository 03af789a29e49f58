//! Orchestration: input reader -> worker pool -> result consumer.

use anyhow::{anyhow, Context, Result};
use std::io::Read;
use std::sync::Arc;
use std::thread;

use crate::config::UrlCountConfig;
use crate::consumer::{self, Tally};
use crate::fetch::WordCounter;
use crate::pool::{JobResult, Pool, PoolSummary};
use crate::source::{self, SourceSummary};

/// Everything known about a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub tally: Tally,
    pub pool: PoolSummary,
    pub source: SourceSummary,
}

/// Count `cfg.target_word` across every URL read from `input`, using at most
/// `cfg.workers` concurrent fetches through `counter`.
///
/// Configuration is checked before any input is read. `report` is called on the
/// calling thread for each result as it arrives. Fetch failures are logged and do
/// not fail the run.
pub fn run_pipeline<R, F>(
    input: R,
    cfg: &UrlCountConfig,
    counter: Arc<dyn WordCounter>,
    report: F,
) -> Result<RunSummary>
where
    R: Read + Send + 'static,
    F: FnMut(&JobResult),
{
    cfg.validate().context("invalid configuration")?;
    let mut pool = Pool::new(cfg.workers, cfg.target_word.clone(), counter)
        .context("create worker pool")?;
    let stream = pool.results().context("result stream already taken")?;

    let (jobs, reader) = source::spawn_reader(input).context("spawn reader thread")?;
    let dispatcher = thread::Builder::new()
        .name("urlcount-dispatcher".into())
        .spawn(move || pool.run(jobs))
        .context("spawn dispatcher thread")?;

    let tally = consumer::consume(stream, report);

    let pool = dispatcher
        .join()
        .map_err(|_| anyhow!("dispatcher thread panicked"))?
        .context("worker pool failed")?;

    let source = if pool.input_abandoned {
        // The reader may still be parked on a blocking read; leave it behind.
        tracing::warn!("input abandoned before end of stream");
        SourceSummary::default()
    } else {
        reader
            .join()
            .map_err(|_| anyhow!("reader thread panicked"))?
    };

    tracing::info!(
        total = tally.total,
        results = tally.results,
        failed = pool.failed,
        skipped_blank = pool.skipped_blank,
        workers = pool.workers_spawned,
        "run finished"
    );

    Ok(RunSummary {
        tally,
        pool,
        source,
    })
}
