use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::utils::ConversionError;

/// Decoder strategy picked from a file's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecoderKind {
    JPEG,
    PNG,
    BMP,
    /// Unknown extension: sniff the leading bytes instead
    Auto,
}

impl DecoderKind {
    /// Pick the decoder for `path` by its lowercased extension.
    ///
    /// Never fails; anything unrecognised (or no extension at all) falls back
    /// to [`DecoderKind::Auto`].
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Auto)
    }

    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Self::JPEG,
            "png" => Self::PNG,
            "bmp" => Self::BMP,
            _ => Self::Auto,
        }
    }

    /// The `image` format this decoder reads, `None` for [`DecoderKind::Auto`].
    pub fn image_format(&self) -> Option<image::ImageFormat> {
        match self {
            Self::JPEG => Some(image::ImageFormat::Jpeg),
            Self::PNG => Some(image::ImageFormat::Png),
            Self::BMP => Some(image::ImageFormat::Bmp),
            Self::Auto => None,
        }
    }
}

/// Sniff the container format from the magic number at the head of `bytes`.
///
/// Only formats compiled into the decoder stack count as a match.
pub fn detect_format(bytes: &[u8]) -> Result<image::ImageFormat, ConversionError> {
    let format = image::guess_format(bytes)
        .map_err(|_| ConversionError::UnsupportedFormat("unrecognized file signature".to_string()))?;

    if !format.reading_enabled() {
        return Err(ConversionError::UnsupportedFormat(format!(
            "no decoder available for {format:?}"
        )));
    }

    Ok(format)
}
