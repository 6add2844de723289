//! Byte-level image encoding for transfer.
//!
//! Tiles travel as PNG (lossless, small, one file per tile); full images
//! are archived as TIFF per the object key layout.

use super::error::PipelineError;
use image::{GrayImage, ImageFormat};
use std::io::Cursor;

/// Encodes a tile as PNG bytes.
pub fn encode_png(image: &GrayImage) -> Result<Vec<u8>, PipelineError> {
    let mut data = Vec::new();
    image.write_to(&mut Cursor::new(&mut data), ImageFormat::Png)?;
    Ok(data)
}

/// Encodes a full image as TIFF bytes.
pub fn encode_tiff(image: &GrayImage) -> Result<Vec<u8>, PipelineError> {
    let mut data = Vec::new();
    image.write_to(&mut Cursor::new(&mut data), ImageFormat::Tiff)?;
    Ok(data)
}

/// Decodes image bytes (any supported format) to 8-bit grayscale.
pub fn decode_gray(data: &[u8]) -> Result<GrayImage, PipelineError> {
    Ok(image::load_from_memory(data)?.into_luma8())
}
