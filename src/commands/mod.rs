//! Command handlers for front-ends.
//!
//! This module exposes the operations a presentation layer invokes:
//! - [`convert_image`]: Convert a single image
//! - [`convert_images`]: Batch convert multiple images
//! - [`spawn_conversion`]: Batch convert in the background with a progress stream
//! - [`cancel_conversion`]: Abort the batch in flight

mod image;
mod worker;

pub use self::image::*;
pub use worker::*;
