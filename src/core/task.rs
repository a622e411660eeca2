//! Conversion request definition and creation.

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::utils::{resolve_output_path, validate_quality, ConverterResult};

/// Represents a single conversion task.
///
/// Immutable once built; each worker owns its own request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRequest {
    /// Path to the source image file
    input_path: PathBuf,
    /// Where the WebP file goes; `None` means next to the input
    output_path: Option<PathBuf>,
    /// Lossy WebP quality (1-100)
    quality: u32,
}

impl ConversionRequest {
    pub fn new(input_path: impl Into<PathBuf>, output_path: Option<PathBuf>, quality: u32) -> Self {
        Self {
            input_path: input_path.into(),
            output_path,
            quality,
        }
    }

    /// Builds a request for use outside a batch, checking the quality up front.
    pub fn validated(
        input_path: impl Into<PathBuf>,
        output_path: Option<PathBuf>,
        quality: u32,
    ) -> ConverterResult<Self> {
        validate_quality(quality)?;
        Ok(Self::new(input_path, output_path, quality))
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    /// Destination path, resolved next to the input when none was given.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| resolve_output_path(&self.input_path, None))
    }

    pub fn quality(&self) -> u32 {
        self.quality
    }
}
