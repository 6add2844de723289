//! Collector flow: reassemble worker output into a full-resolution mask.

use super::error::PipelineError;
use super::images::{decode_gray, encode_tiff};
use crate::codec::{center_crop, stitch, CodecError, StitchMode};
use crate::config::PipelineConfig;
use crate::meta::GroupMeta;
use crate::store::keys::{self, Role};
use crate::store::{ObjectStore, ObjectStoreGateway};
use image::imageops::{self, FilterType};
use image::GrayImage;
use tracing::{info, warn};

/// Downloads a group's mask tiles and stitches them back into the image
/// recorded at slice time.
///
/// Tiles are placed by the index parsed from their key, so out-of-order
/// listings and missing tiles both resolve to the right positions — a gap
/// stays zero-filled rather than shifting its neighbors. The configured
/// [`StitchMode`] decides whether a count mismatch is a warning or an
/// error.
pub struct Collector<S> {
    store: ObjectStoreGateway<S>,
    config: PipelineConfig,
}

impl<S: ObjectStore> Collector<S> {
    pub fn new(store: ObjectStoreGateway<S>, config: PipelineConfig) -> Self {
        Self { store, config }
    }

    /// Stitches the group's masks and crops to the size that was tiled.
    ///
    /// The output matches `meta.image` — the working size after any
    /// pre-slice shrink, not `meta.orig_image`. Callers needing the
    /// pre-shrink resolution can upsample using the sizes in the record.
    pub async fn collect_group(&self, group: &str) -> Result<GrayImage, PipelineError> {
        let meta_bytes = self.store.get_bytes(&keys::meta_key(group)).await?;
        let meta = GroupMeta::from_json_bytes(&meta_bytes)?;
        let grid = meta.grid();
        let expected = grid.tile_count();

        let mask_keys = self.store.list(&keys::tile_prefix(group, Role::Mask)).await?;
        if mask_keys.len() != expected {
            match self.config.stitch_mode {
                StitchMode::Strict => {
                    return Err(
                        CodecError::shape_mismatch(grid.rows, grid.cols, mask_keys.len()).into(),
                    )
                }
                StitchMode::Lenient => warn!(
                    group,
                    expected,
                    actual = mask_keys.len(),
                    "mask tile count does not match metadata"
                ),
            }
        }

        let tile_size = grid.tile_size;
        let mut tiles = vec![GrayImage::new(tile_size, tile_size); expected];
        for key in &mask_keys {
            let Some(index) = keys::parse_tile_index(key) else {
                warn!(%key, "ignoring non-tile key under mask prefix");
                continue;
            };
            if index >= expected {
                warn!(%key, index, "ignoring tile index outside the grid");
                continue;
            }

            let data = self.store.get_bytes(key).await?;
            let mut tile = decode_gray(&data)?;
            if tile.dimensions() != (tile_size, tile_size) {
                tile = imageops::resize(&tile, tile_size, tile_size, FilterType::Nearest);
            }
            tiles[index] = tile;
        }

        let stitched = stitch(
            &tiles,
            tile_size,
            grid.rows,
            grid.cols,
            self.config.stitch_mode,
        )?;
        let mask = center_crop(&stitched, meta.image.h, meta.image.w)?;
        info!(group, h = mask.height(), w = mask.width(), "collected group mask");
        Ok(mask)
    }

    /// Collects the group and archives the full mask at
    /// `{group}/mask.tiff`.
    pub async fn publish_group(&self, group: &str) -> Result<GrayImage, PipelineError> {
        let mask = self.collect_group(group).await?;
        self.store
            .put_bytes(&keys::image_key(group, Role::Mask), encode_tiff(&mask)?.into())
            .await?;
        Ok(mask)
    }
}
