//! Image byte-boundary helpers: decode uploads, encode PNG responses.
//!
//! All bytes leaving the crate are PNG: lossless with an alpha channel, so
//! erase/transparency edits survive the trip to the caller.

use std::io::Cursor;

use image::codecs::png::PngEncoder;
use image::{ColorType, DynamicImage, ImageEncoder, RgbaImage};

use crate::error::Error;

/// Decode uploaded bytes into a [`DynamicImage`] (any format the `image`
/// crate recognizes). Fails with [`Error::InvalidImage`] on undecodable input.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, Error> {
    image::load_from_memory(bytes).map_err(|e| Error::InvalidImage(e.to_string()))
}

/// Encode an RGBA buffer as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();
    PngEncoder::new(Cursor::new(&mut bytes)).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ColorType::Rgba8,
    )?;
    Ok(bytes)
}
