//! Error types for the WebP converter.
//!
//! Provides a hierarchy of error types using `thiserror` for ergonomic error handling.
//! Validation errors are batch-fatal; conversion errors stay local to one file.

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use serde::Serialize;

/// Validation errors raised before any file is touched.
#[derive(Error, Debug, Serialize)]
pub enum ValidationError {
    /// Path-related validation error
    #[error("Path error: {0}")]
    Path(#[from] PathError),
    /// Invalid settings error
    #[error("Settings error: {0}")]
    Settings(String),
    /// Nothing to convert
    #[error("No files selected")]
    EmptyWorklist,
}

/// File path errors.
#[derive(Error, Debug, Serialize)]
pub enum PathError {
    /// Path does not exist
    #[error("Not found: {0}")]
    NotFound(PathBuf),
    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotDirectory(PathBuf),
    /// IO error accessing the path
    #[error("IO error: {0}")]
    IO(String),
}

/// Failure of a single conversion, tagged with the phase that failed.
///
/// The `Display` text is what ends up in `Outcome::Failure`, so every variant
/// leads with the phase name.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ConversionError {
    #[error("opening file: {0}")]
    Open(String),

    #[error("decoding image: {0}")]
    Decode(String),

    /// Neither the extension nor the leading bytes matched a known decoder
    #[error("decoding image: unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("creating output: {0}")]
    CreateOutput(String),

    #[error("encoding webp: {0}")]
    Encode(String),

    #[error("writing output: {0}")]
    Write(String),

    /// The batch was cancelled; carries the phase that was skipped
    #[error("cancelled before {0}")]
    Cancelled(String),
}

/// Main error type for the converter library.
#[derive(Error, Debug, Serialize)]
pub enum ConverterError {
    /// Options or worklist validation failed
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A single-file conversion failed
    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// File IO error
    #[error("IO error: {0}")]
    IO(String),
}

/// Convenience result type for converter operations.
pub type ConverterResult<T> = Result<T, ConverterError>;

// Helper methods for validation error creation
impl ValidationError {
    pub fn path_not_found(path: impl Into<PathBuf>) -> Self {
        Self::Path(PathError::NotFound(path.into()))
    }

    pub fn not_a_directory(path: impl Into<PathBuf>) -> Self {
        Self::Path(PathError::NotDirectory(path.into()))
    }

    pub fn settings(msg: impl Into<String>) -> Self {
        Self::Settings(msg.into())
    }
}

impl ConversionError {
    /// True for decode-phase failures, including unsupported formats.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::UnsupportedFormat(_))
    }
}

// Convert std::io::Error to ConverterError
impl From<io::Error> for ConverterError {
    fn from(err: io::Error) -> Self {
        Self::IO(err.to_string())
    }
}

// Convert io::Error to PathError
impl From<io::Error> for PathError {
    fn from(err: io::Error) -> Self {
        Self::IO(err.to_string())
    }
}

// Convert PathError to ConverterError
impl From<PathError> for ConverterError {
    fn from(err: PathError) -> Self {
        Self::Validation(ValidationError::Path(err))
    }
}
