//! Worker flow: consume tile messages, score them, publish masks.

use super::error::PipelineError;
use super::images::{decode_gray, encode_png};
use crate::config::PipelineConfig;
use crate::infer::{predict_tiles, MaskPredictor};
use crate::queue::{QueueGateway, WorkQueue};
use crate::store::keys::{self, Role};
use crate::store::{ObjectStore, ObjectStoreGateway};
use std::path::PathBuf;
use tracing::info;

/// Consumes tile work from the queue, runs inference, and uploads masks.
///
/// Messages are acknowledged strictly after the corresponding masks are
/// durably stored — under at-least-once delivery that ordering is the
/// only thing standing between a crashed worker and silent tile loss. A
/// redelivered message reprocesses its tile and overwrites the same mask
/// key, which is harmless.
pub struct Worker<S, Q, P> {
    store: ObjectStoreGateway<S>,
    queue: QueueGateway<Q>,
    predictor: P,
    config: PipelineConfig,
    work_dir: PathBuf,
}

impl<S: ObjectStore, Q: WorkQueue, P: MaskPredictor> Worker<S, Q, P> {
    pub fn new(
        store: ObjectStoreGateway<S>,
        queue: QueueGateway<Q>,
        predictor: P,
        config: PipelineConfig,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            queue,
            predictor,
            config,
            work_dir: work_dir.into(),
        }
    }

    /// Processes one batch of queued tiles. Returns how many were scored.
    ///
    /// Receives up to `receive_rounds` messages, downloads their tiles,
    /// scores them in model-sized batches, uploads the masks, and only
    /// then deletes the messages. Returns 0 when the queue is empty.
    pub async fn process_batch(&self) -> Result<usize, PipelineError> {
        let messages = self.queue.receive_up_to(self.config.receive_rounds).await?;
        if messages.is_empty() {
            info!("queue drained, nothing to process");
            return Ok(0);
        }

        // every body must be a tile key before any transfer starts
        let mut tile_keys = Vec::with_capacity(messages.len());
        for message in &messages {
            let parsed = keys::parse_tile_key(&message.body)
                .ok_or_else(|| PipelineError::UnexpectedKey(message.body.clone()))?;
            tile_keys.push(parsed);
        }

        let downloads: Vec<(String, PathBuf)> = messages
            .iter()
            .map(|m| (m.body.clone(), self.work_dir.join(&m.body)))
            .collect();
        self.store
            .download_many(downloads.clone(), self.config.transfer_concurrency)
            .await?;

        let mut tiles = Vec::with_capacity(downloads.len());
        for (_, path) in &downloads {
            let data = tokio::fs::read(path)
                .await
                .map_err(|e| PipelineError::local_io(path, e))?;
            tiles.push(decode_gray(&data)?);
        }

        let masks = predict_tiles(&self.predictor, &tiles).await?;

        let mut uploads = Vec::with_capacity(masks.len());
        for (tile_key, mask) in tile_keys.iter().zip(&masks) {
            let mask_key = tile_key.with_role(Role::Mask);
            let path = self.work_dir.join(&mask_key);
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| PipelineError::local_io(parent, e))?;
            }
            let data = encode_png(mask)?;
            tokio::fs::write(&path, &data)
                .await
                .map_err(|e| PipelineError::local_io(&path, e))?;
            uploads.push((path, mask_key));
        }
        self.store
            .upload_many(uploads, self.config.transfer_concurrency)
            .await?;

        // acknowledge only now that every mask is durably stored
        let handles: Vec<String> = messages
            .iter()
            .map(|m| m.receipt_handle.clone())
            .collect();
        self.queue.delete_many(&handles).await?;

        info!(count = messages.len(), "scored and published tile batch");
        Ok(messages.len())
    }
}
