//! Error type for the pipeline flows.

use crate::codec::CodecError;
use crate::fleet::FleetError;
use crate::infer::PredictError;
use crate::meta::MetaError;
use crate::queue::QueueError;
use crate::store::StoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by producer, worker, and collector flows.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Meta(#[from] MetaError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Predict(#[from] PredictError),

    #[error(transparent)]
    Fleet(#[from] FleetError),

    /// Encoding or decoding an image file failed.
    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),

    /// Local filesystem failure in a flow step.
    #[error("local I/O error at {path}: {source}")]
    LocalIo {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A queue message body is not a tile key.
    #[error("unexpected object key in queue message: {0}")]
    UnexpectedKey(String),
}

impl PipelineError {
    pub(crate) fn local_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::LocalIo {
            path: path.into(),
            source,
        }
    }
}
