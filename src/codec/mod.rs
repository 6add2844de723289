//! Tile codec: pure geometry and pixel-array transforms.
//!
//! Everything here is deterministic and I/O-free. The codec defines the
//! contract that lets independent processes reconstruct a full image from
//! tiles processed out of order, possibly on different machines:
//!
//! ```text
//! ┌──────────┐  pad + slice   ┌──────────────┐  stitch + crop  ┌──────────┐
//! │  image   │ ─────────────► │ tiles 0..n-1 │ ──────────────► │  image   │
//! │  h x w   │                │ (row-major)  │                 │  h x w   │
//! └──────────┘                └──────────────┘                 └──────────┘
//! ```
//!
//! Padding centers the content on the canvas and [`center_crop`] removes
//! it symmetrically, so slice → stitch → crop recovers the input exactly.

mod error;
mod grid;
mod normalize;
mod slice;
mod stitch;

pub use error::CodecError;
pub use grid::{index_width, TileGrid, MIN_INDEX_WIDTH};
pub use normalize::normalize;
pub use slice::{pad_image, shrink_to_fit, slice_to_tiles};
pub use stitch::{center_crop, stitch, StitchMode};
