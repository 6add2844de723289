//! Producer flow: slice an image group and fan its tiles out as work.

use super::error::PipelineError;
use super::images::{encode_png, encode_tiff};
use crate::codec::{normalize, shrink_to_fit, slice_to_tiles, TileGrid};
use crate::config::PipelineConfig;
use crate::meta::{write_meta, Dimensions, GroupMeta};
use crate::queue::{QueueGateway, WorkQueue};
use crate::store::keys::{self, Role};
use crate::store::{ObjectStore, ObjectStoreGateway};
use image::GrayImage;
use std::path::PathBuf;
use tracing::info;

/// Percentile window for pre-tiling intensity normalization.
const NORMALIZE_Q1: f64 = 1.0;
const NORMALIZE_Q2: f64 = 99.0;

/// Slices an image group into tiles and enqueues one work message per
/// tile.
///
/// Everything the producer writes is idempotent — the metadata record,
/// local tile files, and uploaded objects all overwrite — so re-running
/// it for the same group is safe. The only non-idempotent effect is the
/// enqueue, which at-least-once consumers tolerate anyway.
pub struct Producer<S, Q> {
    store: ObjectStoreGateway<S>,
    queue: QueueGateway<Q>,
    config: PipelineConfig,
    work_dir: PathBuf,
}

impl<S: ObjectStore, Q: WorkQueue> Producer<S, Q> {
    pub fn new(
        store: ObjectStoreGateway<S>,
        queue: QueueGateway<Q>,
        config: PipelineConfig,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            queue,
            config,
            work_dir: work_dir.into(),
        }
    }

    /// Prepares one image group: normalize, shrink to the working bound,
    /// slice, persist metadata, upload tiles, enqueue work.
    ///
    /// Returns the metadata record the collector will stitch against.
    pub async fn prepare_group(
        &self,
        group: &str,
        image: &GrayImage,
    ) -> Result<GroupMeta, PipelineError> {
        let orig_image = Dimensions {
            h: image.height(),
            w: image.width(),
        };
        info!(group, h = orig_image.h, w = orig_image.w, "preparing image group");

        let normalized = normalize(image, NORMALIZE_Q1, NORMALIZE_Q2)?;
        let (working, shrunk) = shrink_to_fit(&normalized, self.config.max_working_size);
        if shrunk {
            info!(
                group,
                working_h = working.height(),
                working_w = working.width(),
                "shrunk oversized image to working bound"
            );
        }

        let grid = TileGrid::for_image(working.height(), working.width(), self.config.tile_size)?;
        let tiles = slice_to_tiles(
            &working,
            self.config.tile_size,
            grid.padded_height(),
            grid.padded_width(),
        )?;

        let meta = GroupMeta::new(
            orig_image,
            Dimensions {
                h: working.height(),
                w: working.width(),
            },
            &grid,
        );

        // metadata goes both local (for offline stitching) and to the
        // store, before any tile is announced on the queue
        write_meta(&self.work_dir.join(group).join("meta.json"), &meta)?;
        self.store
            .put_bytes(&keys::meta_key(group), meta.to_json_bytes()?)
            .await?;

        // archive the normalized working image alongside its tiles
        self.store
            .put_bytes(
                &keys::image_key(group, Role::Source),
                encode_tiff(&working)?.into(),
            )
            .await?;

        let width = grid.index_width();
        let tile_dir = self.work_dir.join(group).join(Role::Source.as_str());
        tokio::fs::create_dir_all(&tile_dir)
            .await
            .map_err(|e| PipelineError::local_io(&tile_dir, e))?;

        let mut uploads = Vec::with_capacity(tiles.len());
        for (i, tile) in tiles.iter().enumerate() {
            let path = tile_dir.join(format!("{i:0width$}.png"));
            let data = encode_png(tile)?;
            tokio::fs::write(&path, &data)
                .await
                .map_err(|e| PipelineError::local_io(&path, e))?;
            uploads.push((path, keys::tile_key(group, Role::Source, i, width)));
        }

        self.store
            .upload_many(uploads.clone(), self.config.transfer_concurrency)
            .await?;

        // announce work only after the tiles are durably stored
        for (_, key) in &uploads {
            self.queue.enqueue(key).await?;
        }

        info!(group, tiles = uploads.len(), "image group prepared");
        Ok(meta)
    }
}
