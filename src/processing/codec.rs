//! Decoding into memory and lossy WebP encoding.
//!
//! Decoders come from the `image` crate: JPEG, PNG and BMP are picked by
//! extension, everything else goes through magic-number sniffing. Encoding
//! goes through libwebp (`webp` crate) because `image` only writes lossless WebP.

use std::borrow::Cow;
use std::io::Read;

use image::{DynamicImage, ImageError};
use tracing::debug;

use crate::utils::{ConversionError, DecoderKind, detect_format};

/// Reads all of `stream` and decodes it with the decoder for `kind`.
pub fn decode<R: Read>(mut stream: R, kind: DecoderKind) -> Result<DynamicImage, ConversionError> {
    let mut bytes = Vec::new();
    stream
        .read_to_end(&mut bytes)
        .map_err(|e| ConversionError::Decode(e.to_string()))?;

    decode_bytes(&bytes, kind)
}

/// Decodes an in-memory buffer with the decoder for `kind`.
pub fn decode_bytes(bytes: &[u8], kind: DecoderKind) -> Result<DynamicImage, ConversionError> {
    let format = match kind.image_format() {
        Some(format) => format,
        None => {
            let format = detect_format(bytes)?;
            debug!("Sniffed format: {:?}", format);
            format
        }
    };
    let image = image::load_from_memory_with_format(bytes, format).map_err(map_decode_error)?;

    debug!(
        "Decoded {}x{} {:?} image",
        image.width(),
        image.height(),
        image.color()
    );
    Ok(image)
}

/// Encodes `image` as lossy WebP at `quality` (1 = smallest, 100 = best).
pub fn encode(image: &DynamicImage, quality: u32) -> Result<Vec<u8>, ConversionError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ConversionError::Encode(format!(
            "image has zero dimensions ({}x{})",
            image.width(),
            image.height()
        )));
    }

    let image = to_webp_color_model(image);
    let encoder = webp::Encoder::from_image(&image)
        .map_err(|e| ConversionError::Encode(e.to_string()))?;

    let quality = quality.clamp(1, 100) as f32;
    let memory = encoder
        .encode_simple(false, quality)
        .map_err(|e| ConversionError::Encode(format!("{e:?}")))?;

    if memory.is_empty() {
        return Err(ConversionError::Encode("encoder produced no data".to_string()));
    }
    Ok(memory.to_vec())
}

/// libwebp only takes 8-bit RGB or RGBA; everything else is converted first.
fn to_webp_color_model(image: &DynamicImage) -> Cow<'_, DynamicImage> {
    match image {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => Cow::Borrowed(image),
        other if other.color().has_alpha() => Cow::Owned(DynamicImage::ImageRgba8(other.to_rgba8())),
        other => Cow::Owned(DynamicImage::ImageRgb8(other.to_rgb8())),
    }
}

fn map_decode_error(err: ImageError) -> ConversionError {
    match err {
        ImageError::Unsupported(e) => ConversionError::UnsupportedFormat(e.to_string()),
        other => ConversionError::Decode(other.to_string()),
    }
}
