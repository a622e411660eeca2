use serde::{Deserialize, Serialize};
use crate::core::ConversionResult;

/// Progress message type
#[derive(Debug, Deserialize, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ProgressType {
    Start,
    Progress,
    Complete,
    Error,
}

/// Structured progress event emitted by the batch engine.
///
/// Events are delivered sequentially on the caller's context, one per finished
/// item plus a `Start` and a `Complete` bracket.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// Progress type (start, progress, complete, error)
    pub progress_type: ProgressType,
    /// Number of completed tasks
    pub completed_tasks: usize,
    /// Total number of tasks
    pub total_tasks: usize,
    /// Progress percentage (0-100)
    pub progress_percentage: usize,
    /// Current status message
    pub status: String,
    /// Result of the item that just finished
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ConversionResult>,
}

impl Progress {
    /// Create a new Progress instance with basic information
    pub fn new(
        progress_type: ProgressType,
        completed_tasks: usize,
        total_tasks: usize,
        status: &str,
    ) -> Self {
        let progress_percentage = if total_tasks > 0 {
            (completed_tasks * 100) / total_tasks
        } else {
            0
        };

        Self {
            progress_type,
            completed_tasks,
            total_tasks,
            progress_percentage,
            status: status.to_string(),
            result: None,
        }
    }

    pub fn started(total_tasks: usize) -> Self {
        Self::new(ProgressType::Start, 0, total_tasks, "Converting files...")
    }

    /// Event for one finished item; failures are flagged as `Error`.
    pub fn item_finished(completed_tasks: usize, total_tasks: usize, result: ConversionResult) -> Self {
        let progress_type = if result.is_success() {
            ProgressType::Progress
        } else {
            ProgressType::Error
        };
        let status = format!("Converting... {completed_tasks}/{total_tasks}");

        Self {
            result: Some(result),
            ..Self::new(progress_type, completed_tasks, total_tasks, &status)
        }
    }

    pub fn completed(succeeded: usize, total_tasks: usize) -> Self {
        let status = format!("Complete! {succeeded}/{total_tasks} files converted successfully");
        Self::new(ProgressType::Complete, total_tasks, total_tasks, &status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_is_derived_from_counts() {
        assert_eq!(Progress::new(ProgressType::Progress, 1, 4, "").progress_percentage, 25);
        assert_eq!(Progress::new(ProgressType::Start, 0, 0, "").progress_percentage, 0);
    }

    #[test]
    fn failed_items_are_error_events() {
        let failure = ConversionResult::failure("a.png".into(), "a.webp".into(), "opening file: gone");
        let event = Progress::item_finished(2, 5, failure);
        assert_eq!(event.progress_type, ProgressType::Error);
        assert_eq!(event.status, "Converting... 2/5");
        assert!(event.result.is_some());
    }

    #[test]
    fn completion_reports_summary() {
        let event = Progress::completed(4, 5);
        assert_eq!(event.progress_percentage, 100);
        assert_eq!(event.status, "Complete! 4/5 files converted successfully");
    }
}
