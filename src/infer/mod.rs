//! Inference boundary.
//!
//! The segmentation model itself is external — architecture, weights, and
//! device placement all live behind [`MaskPredictor`]. This module fixes
//! only the contract the pipeline relies on: the batch bound, the binary
//! mask convention, and the thresholding rule, plus an adapter that feeds
//! an arbitrary tile sequence through a predictor in conforming batches.

use image::{GrayImage, ImageBuffer, Luma};
use std::future::Future;
use thiserror::Error;
use tracing::debug;

/// Maximum tiles per predictor call.
pub const INFERENCE_BATCH_SIZE: usize = 4;

/// Per-pixel probability threshold separating mask from background.
pub const MASK_THRESHOLD: f32 = 0.5;

/// Pixel value of masked-in pixels; background is 0.
pub const MASK_FOREGROUND: u8 = 255;

/// Errors from the inference boundary.
#[derive(Debug, Error)]
pub enum PredictError {
    /// The external model failed.
    #[error("inference backend error: {0}")]
    Backend(String),

    /// The predictor returned a different number of masks than tiles.
    #[error("predictor returned {actual} masks for a batch of {expected}")]
    CountMismatch { expected: usize, actual: usize },

    /// A returned mask does not match its tile's dimensions.
    #[error("mask {index} is {actual_w}x{actual_h}, expected {expected_w}x{expected_h}")]
    DimensionMismatch {
        index: usize,
        expected_w: u32,
        expected_h: u32,
        actual_w: u32,
        actual_h: u32,
    },
}

/// Capability trait for the injected scoring model.
///
/// `predict` receives up to [`INFERENCE_BATCH_SIZE`] equally-sized
/// normalized tiles and returns one binary mask per tile (0 background,
/// [`MASK_FOREGROUND`] foreground), each preserving its tile's spatial
/// dimensions. Implementations thresholding raw probabilities should use
/// [`binarize_probabilities`].
pub trait MaskPredictor: Send + Sync {
    fn predict(
        &self,
        batch: &[GrayImage],
    ) -> impl Future<Output = Result<Vec<GrayImage>, PredictError>> + Send;
}

/// Runs a tile sequence through a predictor in batches of at most
/// [`INFERENCE_BATCH_SIZE`], preserving order.
///
/// Validates the predictor's contract on every batch: one mask per tile,
/// dimensions preserved per item.
pub async fn predict_tiles<P: MaskPredictor>(
    predictor: &P,
    tiles: &[GrayImage],
) -> Result<Vec<GrayImage>, PredictError> {
    let mut masks = Vec::with_capacity(tiles.len());
    for batch in tiles.chunks(INFERENCE_BATCH_SIZE) {
        debug!(batch_len = batch.len(), "scoring tile batch");
        let batch_masks = predictor.predict(batch).await?;
        if batch_masks.len() != batch.len() {
            return Err(PredictError::CountMismatch {
                expected: batch.len(),
                actual: batch_masks.len(),
            });
        }
        for (index, (mask, tile)) in batch_masks.iter().zip(batch).enumerate() {
            if mask.dimensions() != tile.dimensions() {
                return Err(PredictError::DimensionMismatch {
                    index: masks.len() + index,
                    expected_w: tile.width(),
                    expected_h: tile.height(),
                    actual_w: mask.width(),
                    actual_h: mask.height(),
                });
            }
        }
        masks.extend(batch_masks);
    }
    Ok(masks)
}

/// Thresholds a per-pixel probability map into a binary mask.
///
/// Probabilities strictly above [`MASK_THRESHOLD`] become
/// [`MASK_FOREGROUND`], everything else 0.
pub fn binarize_probabilities(probabilities: &ImageBuffer<Luma<f32>, Vec<f32>>) -> GrayImage {
    GrayImage::from_fn(probabilities.width(), probabilities.height(), |x, y| {
        let p = probabilities.get_pixel(x, y).0[0];
        Luma([if p > MASK_THRESHOLD { MASK_FOREGROUND } else { 0 }])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Predictor double: masks in every pixel >= 128, recording batch sizes.
    struct ThresholdPredictor {
        calls: AtomicUsize,
        max_batch_seen: AtomicUsize,
    }

    impl ThresholdPredictor {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                max_batch_seen: AtomicUsize::new(0),
            }
        }
    }

    impl MaskPredictor for ThresholdPredictor {
        async fn predict(&self, batch: &[GrayImage]) -> Result<Vec<GrayImage>, PredictError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.max_batch_seen.fetch_max(batch.len(), Ordering::SeqCst);
            Ok(batch
                .iter()
                .map(|tile| {
                    GrayImage::from_fn(tile.width(), tile.height(), |x, y| {
                        let v = tile.get_pixel(x, y).0[0];
                        Luma([if v >= 128 { MASK_FOREGROUND } else { 0 }])
                    })
                })
                .collect())
        }
    }

    /// Predictor double that drops the last mask of every batch.
    struct ShortPredictor;

    impl MaskPredictor for ShortPredictor {
        async fn predict(&self, batch: &[GrayImage]) -> Result<Vec<GrayImage>, PredictError> {
            Ok(batch[..batch.len() - 1].to_vec())
        }
    }

    fn tiles(n: usize) -> Vec<GrayImage> {
        (0..n)
            .map(|i| GrayImage::from_pixel(8, 8, Luma([(i * 40) as u8])))
            .collect()
    }

    #[tokio::test]
    async fn test_batches_bounded_and_order_preserved() {
        let predictor = ThresholdPredictor::new();
        let tiles = tiles(10);

        let masks = predict_tiles(&predictor, &tiles).await.unwrap();
        assert_eq!(masks.len(), 10);
        // 10 tiles -> batches of 4, 4, 2
        assert_eq!(predictor.calls.load(Ordering::SeqCst), 3);
        assert_eq!(predictor.max_batch_seen.load(Ordering::SeqCst), 4);
        // tile 0 (value 0) -> background, tile 4 (value 160) -> foreground
        assert_eq!(masks[0].get_pixel(0, 0).0[0], 0);
        assert_eq!(masks[4].get_pixel(0, 0).0[0], MASK_FOREGROUND);
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_calls() {
        let predictor = ThresholdPredictor::new();
        let masks = predict_tiles(&predictor, &[]).await.unwrap();
        assert!(masks.is_empty());
        assert_eq!(predictor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_count_mismatch_detected() {
        let err = predict_tiles(&ShortPredictor, &tiles(3)).await.unwrap_err();
        assert!(matches!(
            err,
            PredictError::CountMismatch {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_binarize_thresholds_at_half() {
        let probabilities = ImageBuffer::from_fn(3, 1, |x, _| match x {
            0 => Luma([0.2f32]),
            1 => Luma([0.5f32]),
            _ => Luma([0.9f32]),
        });
        let mask = binarize_probabilities(&probabilities);
        assert_eq!(mask.get_pixel(0, 0).0[0], 0);
        // exactly 0.5 stays background
        assert_eq!(mask.get_pixel(1, 0).0[0], 0);
        assert_eq!(mask.get_pixel(2, 0).0[0], MASK_FOREGROUND);
    }
}
