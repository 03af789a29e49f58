//! Worker loop: receive a job, count, emit; exit when the intake channel closes.

use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::sync::mpsc::{Receiver, SyncSender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use crate::fetch::{FetchError, WordCounter};

use super::{JobResult, PoolStats};

/// Everything one worker needs; cloned per worker by the dispatcher.
pub(super) struct WorkerContext {
    pub(super) jobs: Arc<Mutex<Receiver<String>>>,
    pub(super) results: SyncSender<JobResult>,
    pub(super) counter: Arc<dyn WordCounter>,
    pub(super) word: Arc<str>,
    pub(super) stats: Arc<PoolStats>,
}

/// Start a worker thread. It logs through the dispatcher's current subscriber,
/// so a scoped subscriber set around `Pool::run` also sees worker events.
pub(super) fn spawn(index: usize, ctx: WorkerContext) -> io::Result<JoinHandle<()>> {
    let dispatch = tracing::dispatcher::get_default(|d| d.clone());
    thread::Builder::new()
        .name(format!("urlcount-worker-{}", index))
        .spawn(move || tracing::dispatcher::with_default(&dispatch, || ctx.run()))
}

impl WorkerContext {
    /// Blocks until a job arrives; `None` once the intake is closed and empty.
    fn next_job(&self) -> Option<String> {
        let rx = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        rx.recv().ok()
    }

    fn run(self) {
        while let Some(url) = self.next_job() {
            match self.count(&url) {
                Ok(count) => {
                    if self.results.send(JobResult { url, count }).is_ok() {
                        self.stats.emitted.fetch_add(1, Ordering::Relaxed);
                    } else {
                        tracing::debug!("result stream dropped; discarding result");
                    }
                }
                Err(e) => {
                    self.stats.failed.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(url = %url, error = %e, "fetch failed; job dropped");
                }
            }
        }
    }

    fn count(&self, url: &str) -> Result<u64, FetchError> {
        panic::catch_unwind(AssertUnwindSafe(|| self.counter.count(url, &self.word)))
            .unwrap_or_else(|payload| Err(FetchError::Panicked(panic_message(payload.as_ref()))))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
