//! Long-lived converter state for a presentation layer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use crate::processing::{BatchConfig, BatchProcessor};

/// Handle on one registered batch.
#[derive(Debug, Clone)]
pub struct BatchTicket {
    pub id: u64,
    pub token: CancellationToken,
}

/// State a front-end keeps between batches.
///
/// Owns the batch engine and the cancellation token of the batch in flight,
/// so a "stop" action (or Ctrl-C) can abort it from another task.
#[derive(Clone)]
pub struct AppState {
    processor: BatchProcessor,
    next_batch_id: Arc<AtomicU64>,
    active_batch: Arc<Mutex<Option<BatchTicket>>>,
}

impl AppState {
    pub fn new(config: BatchConfig) -> Self {
        Self {
            processor: BatchProcessor::new(config),
            next_batch_id: Arc::new(AtomicU64::new(1)),
            active_batch: Arc::new(Mutex::new(None)),
        }
    }

    pub fn processor(&self) -> &BatchProcessor {
        &self.processor
    }

    /// Registers a new batch and returns the ticket it should run under.
    ///
    /// A batch still registered from before is cancelled first.
    pub fn begin_batch(&self) -> BatchTicket {
        let ticket = BatchTicket {
            id: self.next_batch_id.fetch_add(1, Ordering::Relaxed),
            token: CancellationToken::new(),
        };
        let mut active = self.active_batch.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = active.replace(ticket.clone()) {
            debug!("Superseding unfinished batch {}", previous.id);
            previous.token.cancel();
        }
        ticket
    }

    /// Unregisters `ticket` if it is still the active batch.
    pub fn end_batch(&self, ticket: &BatchTicket) {
        let mut active = self.active_batch.lock().unwrap_or_else(|e| e.into_inner());
        if active.as_ref().is_some_and(|current| current.id == ticket.id) {
            *active = None;
        }
    }

    /// Cancels the batch in flight. Returns `false` when nothing was running.
    pub fn cancel_active(&self) -> bool {
        let active = self.active_batch.lock().unwrap_or_else(|e| e.into_inner());
        match active.as_ref() {
            Some(ticket) => {
                info!("Cancelling batch {}", ticket.id);
                ticket.token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.active_batch
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}
