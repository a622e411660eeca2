use std::path::PathBuf;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::{BatchReport, ConversionOptions, ConversionRequest, ConversionResult, Progress};
use crate::processing::batch::BatchConfig;
use crate::utils::{ConverterResult, resolve_output_path, validate_options, validate_worklist};
use crate::worker::WorkerPool;

/// Fans a worklist out over a bounded worker pool and aggregates the results.
#[derive(Debug, Clone, Default)]
pub struct BatchProcessor {
    config: BatchConfig,
}

impl BatchProcessor {
    pub fn new(config: BatchConfig) -> Self {
        debug!("Creating BatchProcessor with {:?}", config);
        Self { config }
    }

    /// Builds one request per path, with output paths resolved against `options`.
    fn create_requests(&self, paths: Vec<PathBuf>, options: &ConversionOptions) -> Vec<ConversionRequest> {
        paths
            .into_iter()
            .map(|input| {
                let output = resolve_output_path(&input, options.output_directory());
                ConversionRequest::new(input, Some(output), options.quality)
            })
            .collect()
    }

    /// Converts every path in `paths` and reports on the whole batch.
    ///
    /// Fails only when the worklist or options do not validate, in which case
    /// no file has been touched. Per-file failures are recorded in the report.
    /// `progress` is called on the caller's task: once at start, once per
    /// finished file (in completion order) and once at the end.
    pub async fn run<P, F>(
        &self,
        paths: Vec<P>,
        options: &ConversionOptions,
        progress: F,
    ) -> ConverterResult<BatchReport>
    where
        P: Into<PathBuf>,
        F: FnMut(Progress),
    {
        self.run_with_cancellation(paths, options, CancellationToken::new(), progress)
            .await
    }

    /// Like [`run`](Self::run), but stops dispatching once `cancel` fires.
    ///
    /// Files that had not started yet, or were between phases, fail with a
    /// `cancelled` reason; the report still holds one result per path.
    pub async fn run_with_cancellation<P, F>(
        &self,
        paths: Vec<P>,
        options: &ConversionOptions,
        cancel: CancellationToken,
        mut progress: F,
    ) -> ConverterResult<BatchReport>
    where
        P: Into<PathBuf>,
        F: FnMut(Progress),
    {
        let paths: Vec<PathBuf> = paths.into_iter().map(Into::into).collect();
        validate_worklist(&paths)?;
        validate_options(options)?;

        let total_tasks = paths.len();
        let requests = self.create_requests(paths, options);
        let pool = WorkerPool::new(
            self.config.effective_workers(total_tasks),
            self.config.task_timeout,
        );
        info!(
            "Processing batch of {} files with {} workers (quality {})",
            total_tasks,
            pool.worker_count(),
            options.quality
        );

        let start_time = Instant::now();
        progress(Progress::started(total_tasks));

        // Workers only ever send; this task is the single consumer.
        let (result_tx, mut result_rx) = mpsc::unbounded_channel::<(usize, ConversionResult)>();
        let mut pending: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(total_tasks);

        for (index, request) in requests.into_iter().enumerate() {
            pending.push((request.input_path().to_path_buf(), request.output_path()));

            let pool = pool.clone();
            let cancel = cancel.clone();
            let result_tx = result_tx.clone();
            tokio::spawn(async move {
                let input = request.input_path().to_path_buf();
                let output = request.output_path();
                let result = match pool.process(request, &cancel).await {
                    Ok(result) => result,
                    Err(e) => {
                        warn!("Worker failed for {}: {}", input.display(), e);
                        ConversionResult::failure(input, output, e.to_string())
                    }
                };
                // The receiver is gone only if the batch future itself was dropped
                let _ = result_tx.send((index, result));
            });
        }
        drop(result_tx);

        let mut reported = vec![false; total_tasks];
        let mut results = Vec::with_capacity(total_tasks);
        while let Some((index, result)) = result_rx.recv().await {
            reported[index] = true;
            results.push(result.clone());
            progress(Progress::item_finished(results.len(), total_tasks, result));
        }

        // A worker task that died without reporting still owes its path a result
        for ((input, output), _) in pending.into_iter().zip(reported).filter(|(_, done)| !done) {
            warn!("No result reported for {}", input.display());
            let result = ConversionResult::failure(input, output, "worker exited without reporting");
            results.push(result.clone());
            progress(Progress::item_finished(results.len(), total_tasks, result));
        }

        let report = BatchReport::from_results(results, start_time.elapsed().as_millis() as u64);
        progress(Progress::completed(report.succeeded, report.total));

        if cancel.is_cancelled() {
            warn!("Batch cancelled: {}", report.summary());
        } else if report.failed() > 0 {
            warn!(
                "Batch processing completed with {} failed files out of {}",
                report.failed(),
                report.total
            );
        } else {
            info!(
                "Batch processing completed successfully: {} files in {}ms",
                report.total, report.elapsed_ms
            );
        }

        Ok(report)
    }
}
