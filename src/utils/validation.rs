use std::path::{Path, PathBuf};
use crate::core::ConversionOptions;
use crate::utils::{ConverterResult, PathError, ValidationError};

pub const MIN_QUALITY: u32 = 1;
pub const MAX_QUALITY: u32 = 100;

/// Validates batch options before any work is dispatched
pub fn validate_options(options: &ConversionOptions) -> ConverterResult<()> {
    validate_quality(options.quality)?;
    if let Some(dir) = options.output_directory() {
        validate_output_directory(dir)?;
    }
    Ok(())
}

/// Validates the quality setting
pub fn validate_quality(quality: u32) -> ConverterResult<()> {
    if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
        return Err(ValidationError::settings(format!(
            "Invalid quality value: {quality}. Must be between {MIN_QUALITY} and {MAX_QUALITY}"
        ))
        .into());
    }
    Ok(())
}

/// Validates that the output directory exists and is a directory.
///
/// Output directories are never created on the caller's behalf.
pub fn validate_output_directory(dir: &Path) -> ConverterResult<()> {
    let metadata = match std::fs::metadata(dir) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ValidationError::path_not_found(dir).into());
        }
        Err(e) => return Err(PathError::from(e).into()),
    };

    if !metadata.is_dir() {
        return Err(ValidationError::not_a_directory(dir).into());
    }
    Ok(())
}

/// Validates the worklist.
///
/// Only emptiness is fatal. Repeated paths are converted once per listing,
/// the last atomic write winning.
pub fn validate_worklist(paths: &[PathBuf]) -> ConverterResult<()> {
    if paths.is_empty() {
        return Err(ValidationError::EmptyWorklist.into());
    }
    Ok(())
}
