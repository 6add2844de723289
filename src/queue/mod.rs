//! Work queue gateway.
//!
//! The queue is the durable work ledger between producer and workers: one
//! message per tile, at-least-once delivery, explicit post-write
//! acknowledgment. [`WorkQueue`] is the backend capability contract;
//! [`QueueGateway`] layers batched receive rounds and bulk acknowledgment
//! on top of it.

mod gateway;
mod memory;
mod types;

pub use gateway::QueueGateway;
pub use memory::InMemoryQueue;
pub use types::{QueueError, QueueMessage, WorkQueue};
