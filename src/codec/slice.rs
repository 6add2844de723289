//! Image padding, shrinking, and slicing into tiles.
//!
//! Slicing is pure and deterministic: the same image, tile size, and target
//! canvas always produce the identical ordered tile sequence, so a restarted
//! producer regenerates byte-identical tiles.

use super::error::CodecError;
use image::imageops::{self, FilterType};
use image::GrayImage;

/// Zero-pads an image onto a `target_h x target_w` canvas.
///
/// The image content is centered on the canvas: `floor(pad / 2)` rows/cols
/// of zeros go above/left and the remainder below/right, pairing exactly
/// with [`center_crop`](super::center_crop) so that padding and cropping
/// round-trip losslessly.
///
/// # Errors
///
/// Returns [`CodecError::Validation`] if a target dimension is smaller than
/// the corresponding image dimension.
pub fn pad_image(image: &GrayImage, target_h: u32, target_w: u32) -> Result<GrayImage, CodecError> {
    let (w, h) = image.dimensions();
    if target_h < h || target_w < w {
        return Err(CodecError::Validation(format!(
            "pad target {target_h}x{target_w} is smaller than image {h}x{w}"
        )));
    }

    let top = (target_h - h) / 2;
    let left = (target_w - w) / 2;

    let mut canvas = GrayImage::new(target_w, target_h);
    imageops::replace(&mut canvas, image, i64::from(left), i64::from(top));
    Ok(canvas)
}

/// Pads an image to the target canvas and cuts it into square tiles.
///
/// Tiles are produced in row-major order: tile `i` covers grid position
/// `(i / cols, i % cols)` where `cols = target_w / tile_size`.
///
/// # Errors
///
/// Returns [`CodecError::Validation`] if `tile_size` is zero, if a target
/// dimension is not a multiple of `tile_size`, or if the target canvas is
/// smaller than the image.
pub fn slice_to_tiles(
    image: &GrayImage,
    tile_size: u32,
    target_h: u32,
    target_w: u32,
) -> Result<Vec<GrayImage>, CodecError> {
    if tile_size == 0 {
        return Err(CodecError::Validation("tile size must be > 0".to_string()));
    }
    if target_h % tile_size != 0 || target_w % tile_size != 0 {
        return Err(CodecError::Validation(format!(
            "target {target_h}x{target_w} is not a multiple of tile size {tile_size}"
        )));
    }

    let padded = pad_image(image, target_h, target_w)?;
    let rows = target_h / tile_size;
    let cols = target_w / tile_size;

    let mut tiles = Vec::with_capacity((rows as usize) * (cols as usize));
    for r in 0..rows {
        for c in 0..cols {
            let tile =
                imageops::crop_imm(&padded, c * tile_size, r * tile_size, tile_size, tile_size)
                    .to_image();
            tiles.push(tile);
        }
    }
    Ok(tiles)
}

/// Shrinks an image so its longest side fits within `max_size`.
///
/// Returns the (possibly resized) image and whether a shrink happened.
/// Aspect ratio is preserved; images already within the bound are returned
/// unchanged. Shrink-only: the result is never larger than the input.
pub fn shrink_to_fit(image: &GrayImage, max_size: u32) -> (GrayImage, bool) {
    let (w, h) = image.dimensions();
    let longest = w.max(h);
    if longest <= max_size || max_size == 0 {
        return (image.clone(), false);
    }

    let factor = f64::from(max_size) / f64::from(longest);
    let new_w = ((f64::from(w) * factor).round() as u32).max(1);
    let new_h = ((f64::from(h) * factor).round() as u32).max(1);
    let shrunk = imageops::resize(image, new_w, new_h, FilterType::Triangle);
    (shrunk, true)
}
