//! Entry points for front-ends converting images.

use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use crate::core::{AppState, BatchReport, BatchTicket, ConversionOptions, ConversionRequest, ConversionResult, Progress};
use crate::utils::ConverterResult;
use crate::worker::WorkerPool;

/// Registration of a running batch with [`AppState`].
///
/// Dropping it unregisters the batch, also when the batch future is dropped
/// mid-flight. In that case its workers are cancelled as well.
struct ActiveBatch<'a> {
    state: &'a AppState,
    ticket: BatchTicket,
}

impl<'a> ActiveBatch<'a> {
    fn register(state: &'a AppState) -> Self {
        Self {
            state,
            ticket: state.begin_batch(),
        }
    }

    fn token(&self) -> CancellationToken {
        self.ticket.token.clone()
    }
}

impl Drop for ActiveBatch<'_> {
    fn drop(&mut self) {
        // No-op for a batch that already finished
        self.ticket.token.cancel();
        self.state.end_batch(&self.ticket);
    }
}

/// Converts a single image.
///
/// `output_path` defaults to the input path with a `.webp` extension. Only an
/// out-of-range quality is an `Err`; conversion failures come back as a
/// result carrying `Outcome::Failure`.
pub async fn convert_image(
    input_path: PathBuf,
    output_path: Option<PathBuf>,
    quality: u32,
) -> ConverterResult<ConversionResult> {
    let request = ConversionRequest::validated(input_path, output_path, quality)?;
    debug!(
        "Received convert_image for {} -> {}",
        request.input_path().display(),
        request.output_path().display()
    );

    let input = request.input_path().to_path_buf();
    let output = request.output_path();
    let result = WorkerPool::new(1, None)
        .process(request, &CancellationToken::new())
        .await
        .unwrap_or_else(|e| ConversionResult::failure(input, output, e.to_string()));

    Ok(result)
}

/// Converts a batch of images, reporting progress through `progress`.
///
/// The batch is registered with `state` while it runs, so
/// [`cancel_conversion`](super::cancel_conversion) can abort it.
pub async fn convert_images<F>(
    state: &AppState,
    paths: Vec<PathBuf>,
    options: ConversionOptions,
    progress: F,
) -> ConverterResult<BatchReport>
where
    F: FnMut(Progress),
{
    debug!("Received convert_images for {} images", paths.len());

    let batch = ActiveBatch::register(state);
    state
        .processor()
        .run_with_cancellation(paths, &options, batch.token(), progress)
        .await
}

/// Starts a batch in the background and hands back its progress stream.
///
/// For front-ends with their own event loop: drain the receiver from the UI
/// context, then await the handle for the final report. The stream ends once
/// the `Complete` event has been sent.
pub fn spawn_conversion(
    state: &AppState,
    paths: Vec<PathBuf>,
    options: ConversionOptions,
) -> (JoinHandle<ConverterResult<BatchReport>>, mpsc::UnboundedReceiver<Progress>) {
    let (progress_tx, progress_rx) = mpsc::unbounded_channel();
    let state = state.clone();

    let handle = tokio::spawn(async move {
        let batch = ActiveBatch::register(&state);
        state
            .processor()
            .run_with_cancellation(paths, &options, batch.token(), move |event| {
                // Receiver dropped means nobody is watching; keep converting
                let _ = progress_tx.send(event);
            })
            .await
    });

    (handle, progress_rx)
}
