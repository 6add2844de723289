//! Error types for tile geometry operations.

use thiserror::Error;

/// Errors that can occur during tile slicing, stitching, and cropping.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Tile count does not match the grid recorded in metadata.
    #[error("shape mismatch: {actual} tiles for a {rows}x{cols} grid (expected {expected})")]
    ShapeMismatch {
        /// Grid rows from metadata
        rows: u32,
        /// Grid columns from metadata
        cols: u32,
        /// Tiles the grid requires (`rows * cols`)
        expected: usize,
        /// Tiles actually supplied
        actual: usize,
    },

    /// Invalid argument, detected before any work is done.
    #[error("validation error: {0}")]
    Validation(String),
}

impl CodecError {
    /// Creates a shape-mismatch error for a grid of the given dimensions.
    pub fn shape_mismatch(rows: u32, cols: u32, actual: usize) -> Self {
        CodecError::ShapeMismatch {
            rows,
            cols,
            expected: (rows as usize) * (cols as usize),
            actual,
        }
    }
}
