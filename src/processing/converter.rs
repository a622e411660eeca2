//! Single-file conversion: open, decode, encode, write.
//!
//! Every failure is captured as data in the returned [`ConversionResult`];
//! nothing here is allowed to take down the caller.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::core::{ConversionRequest, ConversionResult};
use crate::processing::codec;
use crate::utils::{ConversionError, DecoderKind, extract_filename, file_size, write_atomically};

/// Converts the file described by `request`.
pub fn convert(request: &ConversionRequest) -> ConversionResult {
    convert_file(request.input_path(), &request.output_path(), request.quality())
}

/// Like [`convert`], but gives up at the next phase boundary once `token` is cancelled.
///
/// Used by the worker pool so an aborted batch stops touching the filesystem.
pub fn convert_cancellable(request: &ConversionRequest, token: &CancellationToken) -> ConversionResult {
    let output = request.output_path();
    finish(
        request.input_path(),
        &output,
        try_convert(request.input_path(), &output, request.quality(), Some(token)),
    )
}

/// Converts `input` to WebP at `output` with the given quality.
///
/// The output is only replaced once the WebP bytes are fully encoded and
/// written; a failed conversion never leaves a truncated file behind.
pub fn convert_file(input: &Path, output: &Path, quality: u32) -> ConversionResult {
    finish(input, output, try_convert(input, output, quality, None))
}

fn finish(input: &Path, output: &Path, outcome: Result<u64, ConversionError>) -> ConversionResult {
    match outcome {
        Ok(output_size) => {
            let original_size = file_size(input);
            let result = ConversionResult::success(
                input.to_path_buf(),
                output.to_path_buf(),
                original_size,
                output_size,
            );
            debug!(
                "'{}' -> '{}' ({} bytes saved / {:.1}%)",
                extract_filename(input),
                extract_filename(output),
                result.saved_bytes,
                result.compression_ratio
            );
            result
        }
        Err(e) => {
            warn!("Conversion failed for {}: {}", input.display(), e);
            ConversionResult::failure(input.to_path_buf(), PathBuf::from(output), e.to_string())
        }
    }
}

/// Runs the phases in order, returning the size of the written WebP file.
fn try_convert(
    input: &Path,
    output: &Path,
    quality: u32,
    token: Option<&CancellationToken>,
) -> Result<u64, ConversionError> {
    let checkpoint = |phase: &str| match token {
        Some(token) if token.is_cancelled() => Err(ConversionError::Cancelled(phase.to_string())),
        _ => Ok(()),
    };

    checkpoint("opening file")?;
    let file = File::open(input)
        .map_err(|e| ConversionError::Open(format!("{}: {e}", input.display())))?;

    let image = codec::decode(BufReader::new(file), DecoderKind::from_path(input))?;

    checkpoint("encoding webp")?;
    let webp = codec::encode(&image, quality)?;
    drop(image);

    checkpoint("writing output")?;
    write_atomically(output, &webp, token)?;
    Ok(webp.len() as u64)
}
