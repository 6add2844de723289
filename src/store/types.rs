//! Object store capability trait and error types.

use bytes::Bytes;
use std::future::Future;
use std::path::PathBuf;
use thiserror::Error;

/// One page of a key listing.
///
/// Listing is paginated via continuation tokens: each page is a single
/// backend call, and a `None` continuation means the listing is complete.
/// The token format is backend-defined and opaque to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPage {
    /// Keys in this page, in backend order.
    pub keys: Vec<String>,
    /// Token to pass to the next `list_page` call, or `None` when done.
    pub continuation: Option<String>,
}

/// Errors from object store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested object does not exist.
    #[error("object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// Backend call failed (network, throttling, service error).
    #[error("object store backend error: {0}")]
    Backend(String),

    /// Local filesystem failure during a transfer.
    #[error("local file error at {path}: {source}")]
    LocalIo {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A transfer task panicked or was torn down mid-flight.
    #[error("transfer task failed: {0}")]
    TransferTask(String),
}

/// Capability trait for a key-value object store.
///
/// Implementations wrap a concrete backend (S3-compatible service, local
/// fake, in-memory double). Backend quirks are part of the contract so
/// alternate backends swap in without touching call sites:
/// listing is paginated one page per call, and deletion is bulk.
pub trait ObjectStore: Send + Sync + 'static {
    /// Stores an object, overwriting any existing value at the key.
    ///
    /// Overwrite semantics make downstream retries idempotent: writing the
    /// same output key twice is harmless.
    fn put(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Fetches an object's bytes.
    fn get(&self, bucket: &str, key: &str)
        -> impl Future<Output = Result<Bytes, StoreError>> + Send;

    /// Lists one page of keys under a prefix.
    ///
    /// Pass the previous page's continuation token to advance; `None`
    /// starts from the beginning.
    fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation: Option<&str>,
    ) -> impl Future<Output = Result<ListPage, StoreError>> + Send;

    /// Deletes a batch of keys. Missing keys are not an error.
    fn delete_many(
        &self,
        bucket: &str,
        keys: &[String],
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
