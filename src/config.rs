//! Pipeline configuration.

use crate::codec::StitchMode;

/// Default tile side length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 512;

/// Default working-size bound, in tiles per side: images whose longest
/// side exceeds `tile_size * WORKING_SIZE_TILE_FACTOR` are shrunk before
/// slicing.
pub const WORKING_SIZE_TILE_FACTOR: u32 = 40;

/// Default receive rounds per worker batch.
pub const DEFAULT_RECEIVE_ROUNDS: usize = 8;

/// Default bound for concurrent object-store transfers: the available I/O
/// parallelism, falling back to 4 when it cannot be determined.
pub fn default_transfer_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(4)
}

/// Settings shared by producer, worker, and collector.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Tile side length in pixels (default: 512)
    pub tile_size: u32,

    /// Longest side an image may have before it is shrunk prior to
    /// slicing (default: `tile_size * 40`)
    pub max_working_size: u32,

    /// Receive rounds per worker batch; bounds the worker's total queue
    /// wait (default: 8)
    pub receive_rounds: usize,

    /// Maximum concurrent object-store transfers (default: available
    /// parallelism)
    pub transfer_concurrency: usize,

    /// Policy when the collected tile count disagrees with the grid
    /// (default: lenient)
    pub stitch_mode: StitchMode,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            max_working_size: DEFAULT_TILE_SIZE * WORKING_SIZE_TILE_FACTOR,
            receive_rounds: DEFAULT_RECEIVE_ROUNDS,
            transfer_concurrency: default_transfer_concurrency(),
            stitch_mode: StitchMode::default(),
        }
    }
}

impl PipelineConfig {
    /// Config with a non-default tile size, keeping the working-size
    /// bound proportional.
    pub fn with_tile_size(tile_size: u32) -> Self {
        Self {
            tile_size,
            max_working_size: tile_size * WORKING_SIZE_TILE_FACTOR,
            ..Self::default()
        }
    }
}
