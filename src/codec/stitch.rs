//! Stitching tiles back into a full image and cropping to final size.

use super::error::CodecError;
use image::imageops;
use image::GrayImage;
use tracing::warn;

/// Policy for handling a tile count that disagrees with the grid.
///
/// The lenient mode logs and zero-fills missing positions; the strict mode
/// fails with [`CodecError::ShapeMismatch`] instead. Callers choose
/// explicitly; lenient is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StitchMode {
    /// Warn on mismatch and fill missing tile positions with zeros.
    #[default]
    Lenient,
    /// Fail with [`CodecError::ShapeMismatch`] on any count mismatch.
    Strict,
}

/// Stitches row-major tiles onto a `rows x cols` canvas of `tile_size` blocks.
///
/// Tile `i` lands at grid position `(i / cols, i % cols)`. When fewer tiles
/// than `rows * cols` are supplied, behavior follows `mode`: lenient leaves
/// the remaining positions zero-filled, strict errors. Surplus tiles beyond
/// the grid are never placed (lenient warns, strict errors).
///
/// # Errors
///
/// [`CodecError::ShapeMismatch`] in strict mode when
/// `tiles.len() != rows * cols`; [`CodecError::Validation`] for a zero-sized
/// grid or tile.
pub fn stitch(
    tiles: &[GrayImage],
    tile_size: u32,
    rows: u32,
    cols: u32,
    mode: StitchMode,
) -> Result<GrayImage, CodecError> {
    if tile_size == 0 || rows == 0 || cols == 0 {
        return Err(CodecError::Validation(format!(
            "stitch grid must be non-empty, got {rows}x{cols} tiles of size {tile_size}"
        )));
    }

    let expected = (rows as usize) * (cols as usize);
    if tiles.len() != expected {
        match mode {
            StitchMode::Strict => return Err(CodecError::shape_mismatch(rows, cols, tiles.len())),
            StitchMode::Lenient => warn!(
                expected,
                actual = tiles.len(),
                "tile count does not match grid, missing positions stay zero-filled"
            ),
        }
    }

    let mut canvas = GrayImage::new(cols * tile_size, rows * tile_size);
    for (i, tile) in tiles.iter().enumerate().take(expected) {
        let r = (i / cols as usize) as u32;
        let c = (i % cols as usize) as u32;
        imageops::replace(
            &mut canvas,
            tile,
            i64::from(c * tile_size),
            i64::from(r * tile_size),
        );
    }
    Ok(canvas)
}

/// Crops the centered `target_h x target_w` region out of an image.
///
/// Inverse of [`pad_image`](super::pad_image): cropping a padded image back
/// to its pre-padding size recovers the original pixels exactly.
///
/// # Errors
///
/// [`CodecError::Validation`] if a target dimension is zero or exceeds the
/// current dimension.
pub fn center_crop(image: &GrayImage, target_h: u32, target_w: u32) -> Result<GrayImage, CodecError> {
    let (w, h) = image.dimensions();
    if target_h == 0 || target_w == 0 {
        return Err(CodecError::Validation(
            "crop target must be non-empty".to_string(),
        ));
    }
    if target_h > h || target_w > w {
        return Err(CodecError::Validation(format!(
            "crop target {target_h}x{target_w} exceeds image {h}x{w}"
        )));
    }

    let top = (h - target_h) / 2;
    let left = (w - target_w) / 2;
    Ok(imageops::crop_imm(image, left, top, target_w, target_h).to_image())
}
