//! Core types for conversion settings and results.

use std::fmt;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::utils::extract_filename;

/// Default WebP quality, matching the usual 75-85 interactive range.
pub const DEFAULT_QUALITY: u32 = 80;

/// Options shared by every item of one batch.
///
/// Validated once before dispatch, see [`crate::utils::validate_options`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversionOptions {
    /// Lossy WebP quality (1-100)
    pub quality: u32,
    /// Directory receiving every output; `None` writes next to each input
    pub output_directory: Option<PathBuf>,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            output_directory: None,
        }
    }
}

impl ConversionOptions {
    pub fn new(quality: u32, output_directory: Option<PathBuf>) -> Self {
        Self {
            quality,
            // An empty directory field means "next to the input"
            output_directory: output_directory.filter(|dir| !dir.as_os_str().is_empty()),
        }
    }

    pub fn output_directory(&self) -> Option<&Path> {
        self.output_directory
            .as_deref()
            .filter(|dir| !dir.as_os_str().is_empty())
    }
}

/// How a single conversion ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "camelCase")]
pub enum Outcome {
    Success,
    Failure(String),
}

/// Result of converting one file.
///
/// Produced exactly once per request and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    /// Path to the source image
    pub input_path: PathBuf,
    /// Path the WebP file was (or would have been) written to
    pub output_path: PathBuf,
    pub outcome: Outcome,
    /// Source file size in bytes
    pub original_size: u64,
    /// WebP file size in bytes, 0 on failure
    pub output_size: u64,
    /// Bytes saved (can be negative if the file grew)
    pub saved_bytes: i64,
    /// Size reduction as a percentage of the original
    pub compression_ratio: f64,
}

impl ConversionResult {
    pub fn success(
        input_path: PathBuf,
        output_path: PathBuf,
        original_size: u64,
        output_size: u64,
    ) -> Self {
        let saved_bytes = original_size as i64 - output_size as i64;
        let compression_ratio = if original_size > 0 {
            saved_bytes as f64 / original_size as f64 * 100.0
        } else {
            0.0
        };

        Self {
            input_path,
            output_path,
            outcome: Outcome::Success,
            original_size,
            output_size,
            saved_bytes,
            compression_ratio,
        }
    }

    pub fn failure(input_path: PathBuf, output_path: PathBuf, reason: impl Into<String>) -> Self {
        Self {
            input_path,
            output_path,
            outcome: Outcome::Failure(reason.into()),
            original_size: 0,
            output_size: 0,
            saved_bytes: 0,
            compression_ratio: 0.0,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success)
    }

    /// Failure reason, `None` on success
    pub fn reason(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Success => None,
            Outcome::Failure(reason) => Some(reason),
        }
    }
}

impl fmt::Display for ConversionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = extract_filename(&self.input_path);
        match &self.outcome {
            Outcome::Success => write!(f, "✓ {name}"),
            Outcome::Failure(reason) => write!(f, "✗ {name}: {reason}"),
        }
    }
}

/// Aggregate of one batch run, assembled after every item has finished.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    /// Number of submitted paths
    pub total: usize,
    /// Number of `Outcome::Success` results
    pub succeeded: usize,
    /// One result per submitted path, in completion order
    pub results: Vec<ConversionResult>,
    /// Wall-clock time for the whole batch in milliseconds
    pub elapsed_ms: u64,
    /// Input bytes of the successful conversions
    pub total_input_bytes: u64,
    /// Output bytes of the successful conversions
    pub total_output_bytes: u64,
}

impl BatchReport {
    pub fn from_results(results: Vec<ConversionResult>, elapsed_ms: u64) -> Self {
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        let (total_input_bytes, total_output_bytes) = results
            .iter()
            .filter(|r| r.is_success())
            .fold((0, 0), |(input, output), r| (input + r.original_size, output + r.output_size));

        Self {
            total: results.len(),
            succeeded,
            results,
            elapsed_ms,
            total_input_bytes,
            total_output_bytes,
        }
    }

    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }

    pub fn failures(&self) -> impl Iterator<Item = &ConversionResult> {
        self.results.iter().filter(|r| !r.is_success())
    }

    /// Looks up the result for `input`.
    pub fn result_for(&self, input: impl AsRef<Path>) -> Option<&ConversionResult> {
        let input = input.as_ref();
        self.results.iter().find(|r| r.input_path == input)
    }

    pub fn summary(&self) -> String {
        format!(
            "Complete! {}/{} files converted successfully",
            self.succeeded, self.total
        )
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for result in &self.results {
            writeln!(f, "{result}")?;
        }
        write!(f, "{}", self.summary())
    }
}
