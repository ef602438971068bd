//! Bounded worker pool and deferred batch results.
//!
//! Each session owns one pool, sized to the available processing units (or
//! the configured override). Every element of a batch is submitted as an
//! independent unit of work; the batch yields a single [`Deferred`] whose
//! `wait` blocks until all units finish and then reports the first
//! non-success in submission order.
//!
//! Deliberate policy, preserved from the system's contract: once a unit
//! fails, sibling units already queued or running are NOT cancelled: they
//! run to completion and their side effects persist. There is no timeout and
//! no retry; a panicking unit is mapped to `Unknown` as its terminal result.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Condvar, Mutex};

use tracing::{debug, warn};

use crate::errors::{OpError, OpResult};

/// A unit of work scheduled on the pool.
pub type Job = Box<dyn FnOnce() -> OpResult + Send + 'static>;

#[derive(Default)]
struct Pending {
    count: Mutex<usize>,
    drained: Condvar,
}

pub struct WorkerPool {
    pool: rayon::ThreadPool,
    pending: Arc<Pending>,
    accepting: AtomicBool,
}

impl WorkerPool {
    /// Build a pool with `threads` workers, defaulting to the number of
    /// available processing units.
    pub fn new(threads: Option<usize>) -> Result<Self, OpError> {
        let threads = threads.unwrap_or_else(|| {
            std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
        });
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| {
                warn!(error = %e, "worker pool construction failed");
                OpError::Unknown
            })?;
        debug!(threads, "worker pool ready");
        Ok(Self {
            pool,
            pending: Arc::new(Pending::default()),
            accepting: AtomicBool::new(true),
        })
    }

    /// Submit a batch; one unit per job. Fails with `OperationNotSupported`
    /// once the pool has been drained.
    pub fn submit_batch(&self, jobs: Vec<Job>) -> Result<Deferred, OpError> {
        if !self.accepting.load(Ordering::Acquire) {
            return Err(OpError::OperationNotSupported);
        }
        let expected = jobs.len();
        let (tx, rx) = mpsc::channel();

        {
            let mut count = self
                .pending
                .count
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            *count += expected;
        }

        for (index, job) in jobs.into_iter().enumerate() {
            let tx = tx.clone();
            let pending = Arc::clone(&self.pending);
            self.pool.spawn(move || {
                let result = catch_unwind(AssertUnwindSafe(job)).unwrap_or_else(|_| {
                    warn!(index, "batch unit panicked");
                    Err(OpError::Unknown)
                });
                // The receiver may be gone if the caller dropped the handle;
                // the unit's side effects stand either way.
                let _ = tx.send((index, result));

                let mut count = pending
                    .count
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                *count -= 1;
                if *count == 0 {
                    pending.drained.notify_all();
                }
            });
        }

        Ok(Deferred { rx, expected })
    }

    /// Stop accepting work and block until every in-flight unit completes.
    /// Idempotent; also run on session drop so background mutations are
    /// never orphaned.
    pub fn drain(&self) {
        self.accepting.store(false, Ordering::Release);
        let mut count = self
            .pending
            .count
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        while *count > 0 {
            count = self
                .pending
                .drained
                .wait(count)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }
}

/// Handle to a batch's eventual outcome.
pub struct Deferred {
    rx: mpsc::Receiver<(usize, OpResult)>,
    expected: usize,
}

impl Deferred {
    /// Block until every submitted unit has completed, then return the first
    /// non-success in submission order, or success if all units succeeded.
    pub fn wait(self) -> OpResult {
        let mut first_failure: Option<(usize, OpError)> = None;
        for _ in 0..self.expected {
            // A closed channel means a unit vanished without reporting;
            // treat it as that unit's unknown terminal result.
            let (index, result) = match self.rx.recv() {
                Ok(msg) => msg,
                Err(_) => return Err(OpError::Unknown),
            };
            if let Err(e) = result {
                let earlier = first_failure.map_or(true, |(i, _)| index < i);
                if earlier {
                    first_failure = Some((index, e));
                }
            }
        }
        match first_failure {
            Some((_, e)) => Err(e),
            None => Ok(()),
        }
    }
}
