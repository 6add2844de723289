//! Work queue capability trait and message types.

use std::future::Future;
use thiserror::Error;

/// A delivered queue message.
///
/// The receipt handle authorizes deletion of this specific delivery and is
/// valid only until the message is deleted or the queue's visibility
/// timeout expires. Deleting it before the corresponding output is durably
/// written risks silent loss under at-least-once delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    /// Message body: the object key of a tile awaiting processing.
    pub body: String,
    /// Queue-issued deletion token for this delivery.
    pub receipt_handle: String,
}

/// Errors from queue operations.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Backend call failed (network, throttling, service error).
    #[error("queue backend error: {0}")]
    Backend(String),

    /// The receipt handle is unknown or no longer valid.
    #[error("invalid receipt handle: {0}")]
    InvalidReceipt(String),
}

/// Capability trait for a message queue used as a work ledger.
///
/// Delivery is at-least-once (a queue-system guarantee, not enforced
/// locally); consumers tolerate duplicates by writing outputs to
/// idempotent keys. The backend delivers at most one message per receive
/// call, which is part of the contract — batching is layered on top by
/// [`QueueGateway`](super::QueueGateway).
pub trait WorkQueue: Send + Sync + 'static {
    /// Enqueues a message body. Fire-and-forget.
    fn send(&self, body: &str) -> impl Future<Output = Result<(), QueueError>> + Send;

    /// Receives at most one message, or `None` when the queue is empty.
    fn receive_one(&self)
        -> impl Future<Output = Result<Option<QueueMessage>, QueueError>> + Send;

    /// Deletes a delivered message, acknowledging it as processed.
    fn delete(&self, receipt_handle: &str) -> impl Future<Output = Result<(), QueueError>> + Send;
}
