use std::time::Duration;

/// Failures of the worker machinery itself, as opposed to the conversion it runs.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("cancelled")]
    Cancelled,

    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    #[error("worker panicked: {0}")]
    Panicked(String),

    #[error("Worker pool is closed: {0}")]
    CapacityError(String),
}

pub type WorkerResult<T> = Result<T, WorkerError>;

impl From<tokio::sync::AcquireError> for WorkerError {
    fn from(err: tokio::sync::AcquireError) -> Self {
        WorkerError::CapacityError(format!("Failed to acquire worker: {}", err))
    }
}

impl From<tokio::task::JoinError> for WorkerError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_cancelled() {
            return WorkerError::Cancelled;
        }
        let message = match err.try_into_panic() {
            Ok(payload) => payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string()),
            Err(err) => err.to_string(),
        };
        WorkerError::Panicked(message)
    }
}
