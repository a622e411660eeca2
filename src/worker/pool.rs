use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use crate::core::{ConversionRequest, ConversionResult};
use crate::processing::converter;
use crate::worker::{WorkerError, WorkerResult};
use tracing::{debug, warn};

/// Bounded pool running conversions on tokio's blocking threads.
///
/// At most `worker_count` conversions hold a permit at once. The permit is
/// moved into the blocking closure, so a conversion abandoned by a timeout
/// keeps its slot until the thread actually finishes.
#[derive(Clone)]
pub struct WorkerPool {
    active_workers: Arc<AtomicUsize>,
    semaphore: Arc<Semaphore>,
    worker_count: usize,
    task_timeout: Option<Duration>,
}

/// Decrements the active-worker count when the blocking task ends, however it ends.
struct ActiveWorker(Arc<AtomicUsize>);

impl Drop for ActiveWorker {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl WorkerPool {
    pub fn new(worker_count: usize, task_timeout: Option<Duration>) -> Self {
        let worker_count = worker_count.max(1);
        Self {
            active_workers: Arc::new(AtomicUsize::new(0)),
            semaphore: Arc::new(Semaphore::new(worker_count)),
            worker_count,
            task_timeout,
        }
    }

    /// Runs one conversion once a worker slot is free.
    ///
    /// Returns `Err` only for failures of the pool itself (cancelled before a
    /// slot opened, timed out, panicked); conversion failures come back as an
    /// `Ok` result carrying `Outcome::Failure`.
    pub async fn process(
        &self,
        request: ConversionRequest,
        cancel: &CancellationToken,
    ) -> WorkerResult<ConversionResult> {
        debug!("Acquiring semaphore for task: {}", request.input_path().display());
        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(WorkerError::Cancelled),
            permit = Arc::clone(&self.semaphore).acquire_owned() => permit?,
        };

        let current_workers = self.active_workers.fetch_add(1, Ordering::SeqCst) + 1;
        let active = ActiveWorker(Arc::clone(&self.active_workers));
        debug!(
            "Worker started - Active: {}/{}, Available permits: {}, Task: {}",
            current_workers,
            self.worker_count,
            self.semaphore.available_permits(),
            request.input_path().display()
        );

        let task_token = cancel.child_token();
        let worker_token = task_token.clone();
        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let _active = active;
            converter::convert_cancellable(&request, &worker_token)
        });

        let result = match self.task_timeout {
            Some(limit) => match tokio::time::timeout(limit, handle).await {
                Ok(joined) => joined?,
                Err(_) => {
                    warn!("Conversion exceeded {:?}, abandoning it", limit);
                    // Stops the straggler at its next phase boundary
                    task_token.cancel();
                    return Err(WorkerError::TimedOut(limit));
                }
            },
            None => handle.await?,
        };

        debug!(
            "Worker finished - Active: {}/{}",
            self.active_workers(),
            self.worker_count
        );
        Ok(result)
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn active_workers(&self) -> usize {
        self.active_workers.load(Ordering::SeqCst)
    }
}
