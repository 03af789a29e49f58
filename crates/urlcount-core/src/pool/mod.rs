//! Bounded worker pool.
//!
//! The dispatcher (`Pool::run`) pulls jobs from any iterator, spawns worker
//! threads on demand up to `max_workers`, and hands each non-empty job to a
//! worker over a rendezvous channel. Workers call the [`WordCounter`] and push
//! [`JobResult`]s onto a second rendezvous channel that a single consumer
//! drains through [`ResultStream`]. Both channels have zero capacity, so a slow
//! consumer stalls workers, which stalls the dispatcher, which stalls the source.
//!
//! Shutdown order: input exhausted -> intake closed -> all workers joined ->
//! results closed. The result stream therefore ends only once every job has
//! been processed.

mod worker;

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::fetch::WordCounter;

use worker::WorkerContext;

/// Outcome of one successfully processed job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobResult {
    pub url: String,
    pub count: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// Zero workers would never drain the intake channel.
    #[error("worker count must be at least 1")]
    InvalidWorkerCount,
    #[error("target word must not be empty")]
    EmptyTargetWord,
    /// Not even the first worker thread could be started.
    #[error("could not spawn worker thread")]
    Spawn(#[source] io::Error),
}

/// Counters shared between the dispatcher and workers for one run.
#[derive(Debug, Default)]
struct PoolStats {
    dispatched: AtomicUsize,
    skipped_blank: AtomicUsize,
    failed: AtomicUsize,
    emitted: AtomicUsize,
    workers_spawned: AtomicUsize,
    abnormal_exits: AtomicUsize,
}

impl PoolStats {
    fn snapshot(&self) -> PoolSummary {
        PoolSummary {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            skipped_blank: self.skipped_blank.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            emitted: self.emitted.load(Ordering::Relaxed),
            workers_spawned: self.workers_spawned.load(Ordering::Relaxed),
            abnormal_exits: self.abnormal_exits.load(Ordering::Relaxed),
            input_abandoned: false,
        }
    }
}

/// Totals for a finished run, returned by [`Pool::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolSummary {
    /// Non-empty jobs handed to a worker.
    pub dispatched: usize,
    /// Blank jobs skipped without dispatch.
    pub skipped_blank: usize,
    /// Jobs whose handler call failed (logged and dropped).
    pub failed: usize,
    /// Results delivered to the consumer.
    pub emitted: usize,
    pub workers_spawned: usize,
    /// Workers whose thread ended in a panic outside the handler.
    pub abnormal_exits: usize,
    /// Dispatch stopped before the job sequence ended (every worker had exited).
    pub input_abandoned: bool,
}

/// Read side of the pool's results channel. Ends when the pool has fully shut down.
#[derive(Debug)]
pub struct ResultStream {
    rx: Receiver<JobResult>,
}

impl Iterator for ResultStream {
    type Item = JobResult;

    fn next(&mut self) -> Option<JobResult> {
        self.rx.recv().ok()
    }
}

/// Fixed-bound pool of fetch workers. Construct, take [`Pool::results`], then
/// move the pool onto its own thread and call [`Pool::run`].
pub struct Pool {
    max_workers: usize,
    word: Arc<str>,
    counter: Arc<dyn WordCounter>,
    results_tx: SyncSender<JobResult>,
    results_rx: Option<Receiver<JobResult>>,
    stats: Arc<PoolStats>,
}

impl Pool {
    /// Create a pool that will run at most `max_workers` workers. No threads are started here.
    pub fn new(
        max_workers: usize,
        word: impl Into<String>,
        counter: Arc<dyn WordCounter>,
    ) -> Result<Self, PoolError> {
        if max_workers == 0 {
            return Err(PoolError::InvalidWorkerCount);
        }
        let word: String = word.into();
        if word.is_empty() {
            return Err(PoolError::EmptyTargetWord);
        }
        let (results_tx, results_rx) = mpsc::sync_channel(0);
        Ok(Self {
            max_workers,
            word: Arc::from(word),
            counter,
            results_tx,
            results_rx: Some(results_rx),
            stats: Arc::new(PoolStats::default()),
        })
    }

    /// Take the result stream. Only the first call returns `Some`.
    pub fn results(&mut self) -> Option<ResultStream> {
        self.results_rx.take().map(|rx| ResultStream { rx })
    }

    /// Dispatch every non-empty job from `jobs` to workers, then shut down.
    ///
    /// A worker is spawned for each accepted job until `max_workers` exist, so
    /// never more than `max_workers` fetches are in flight. Blocks until input is
    /// exhausted and every worker has exited; the result stream ends after that.
    pub fn run<I>(self, jobs: I) -> Result<PoolSummary, PoolError>
    where
        I: IntoIterator<Item = String>,
    {
        let Pool {
            max_workers,
            word,
            counter,
            results_tx,
            results_rx,
            stats,
        } = self;
        // Nobody took the stream: workers discard results instead of blocking forever.
        drop(results_rx);

        tracing::debug!(max_workers, word = %word, "pool started");

        let (job_tx, job_rx) = mpsc::sync_channel::<String>(0);
        let mut spawn_rx = Some(Arc::new(Mutex::new(job_rx)));
        let mut workers: Vec<JoinHandle<()>> = Vec::with_capacity(max_workers);
        let mut spawn_error = None;
        let mut input_abandoned = false;

        for job in jobs {
            if job.is_empty() {
                stats.skipped_blank.fetch_add(1, Ordering::Relaxed);
                continue;
            }

            if let Some(rx) = spawn_rx.as_ref() {
                let ctx = WorkerContext {
                    jobs: Arc::clone(rx),
                    results: results_tx.clone(),
                    counter: Arc::clone(&counter),
                    word: Arc::clone(&word),
                    stats: Arc::clone(&stats),
                };
                match worker::spawn(workers.len(), ctx) {
                    Ok(handle) => {
                        workers.push(handle);
                        stats.workers_spawned.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(e) if workers.is_empty() => {
                        spawn_error = Some(e);
                        break;
                    }
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            workers = workers.len(),
                            "could not spawn more workers; continuing with those running"
                        );
                        spawn_rx = None;
                    }
                }
                // At the cap, only workers keep the intake receiver alive, so a send
                // fails instead of blocking if every worker has died.
                if workers.len() >= max_workers {
                    spawn_rx = None;
                }
            }

            if let Err(mpsc::SendError(job)) = job_tx.send(job) {
                tracing::error!(url = %job, "no live workers; abandoning remaining input");
                input_abandoned = true;
                break;
            }
            stats.dispatched.fetch_add(1, Ordering::Relaxed);
        }

        drop(job_tx);
        drop(spawn_rx);

        for handle in workers {
            if handle.join().is_err() {
                stats.abnormal_exits.fetch_add(1, Ordering::Relaxed);
                tracing::warn!("worker thread panicked");
            }
        }
        drop(results_tx);

        if let Some(e) = spawn_error {
            return Err(PoolError::Spawn(e));
        }

        let summary = PoolSummary {
            input_abandoned,
            ..stats.snapshot()
        };
        tracing::debug!(?summary, "pool shut down");
        Ok(summary)
    }
}
