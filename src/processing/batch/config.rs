use std::time::Duration;
use serde::{Serialize, Deserialize};

/// Tuning knobs for the batch engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatchConfig {
    /// Upper bound on concurrent conversions; `None` picks one per CPU
    pub worker_count: Option<usize>,
    /// Per-file time limit; `None` waits indefinitely
    pub task_timeout: Option<Duration>,
}

impl BatchConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.worker_count = Some(workers);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.task_timeout = Some(timeout);
        self
    }

    /// Pool size for a worklist of `items` files: never more workers than files.
    pub fn effective_workers(&self, items: usize) -> usize {
        let wanted = self.worker_count.unwrap_or_else(num_cpus::get);
        wanted.min(items).max(1)
    }
}
