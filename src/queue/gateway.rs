//! Work queue gateway: batched receive and acknowledgment.

use super::types::{QueueError, QueueMessage, WorkQueue};
use std::sync::Arc;
use tracing::{debug, info};

/// Gateway over a [`WorkQueue`] backend.
pub struct QueueGateway<Q> {
    queue: Arc<Q>,
}

impl<Q> Clone for QueueGateway<Q> {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
        }
    }
}

impl<Q: WorkQueue> QueueGateway<Q> {
    /// Creates a gateway over `queue`.
    pub fn new(queue: Arc<Q>) -> Self {
        Self { queue }
    }

    /// Enqueues one message body.
    pub async fn enqueue(&self, body: &str) -> Result<(), QueueError> {
        debug!(body, "enqueueing message");
        self.queue.send(body).await
    }

    /// Receives up to `n` messages in `n` sequential receive rounds.
    ///
    /// Each round is one blocking backend call fetching at most one
    /// message, so `n` bounds the total wait. All `n` rounds run even when
    /// some come back empty; fewer than `n` messages are returned when the
    /// queue drains early.
    pub async fn receive_up_to(&self, n: usize) -> Result<Vec<QueueMessage>, QueueError> {
        let mut messages = Vec::with_capacity(n);
        for round in 0..n {
            let received = self.queue.receive_one().await?;
            debug!(round, received = received.is_some(), "receive round");
            if let Some(message) = received {
                messages.push(message);
            }
        }
        info!(count = messages.len(), rounds = n, "received messages");
        Ok(messages)
    }

    /// Deletes the messages behind `handles`, acknowledging them.
    ///
    /// Call only after the corresponding outputs are durably persisted —
    /// this is the sole mechanism preventing loss under at-least-once
    /// delivery. An undeleted message reappears after the visibility
    /// timeout and is reprocessed; the reprocessed write overwrites the
    /// same output key, which is harmless.
    pub async fn delete_many(&self, handles: &[String]) -> Result<(), QueueError> {
        info!(count = handles.len(), "deleting messages");
        for handle in handles {
            self.queue.delete(handle).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::InMemoryQueue;

    fn gateway() -> (QueueGateway<InMemoryQueue>, Arc<InMemoryQueue>) {
        let queue = Arc::new(InMemoryQueue::new());
        (QueueGateway::new(Arc::clone(&queue)), queue)
    }

    #[tokio::test]
    async fn test_receive_up_to_drained_queue() {
        // 8 rounds against 3 messages: exactly 3 back, 5 empty rounds
        let (gateway, _queue) = gateway();
        for i in 0..3 {
            gateway.enqueue(&format!("g/source/{i:03}.png")).await.unwrap();
        }

        let messages = gateway.receive_up_to(8).await.unwrap();
        assert_eq!(messages.len(), 3);
        let bodies: Vec<&str> = messages.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(
            bodies,
            vec!["g/source/000.png", "g/source/001.png", "g/source/002.png"]
        );
    }

    #[tokio::test]
    async fn test_receive_caps_at_n() {
        let (gateway, queue) = gateway();
        for i in 0..10 {
            gateway.enqueue(&format!("tile-{i}")).await.unwrap();
        }

        let messages = gateway.receive_up_to(4).await.unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(queue.ready_len(), 6);
    }

    #[tokio::test]
    async fn test_delete_many_acknowledges() {
        let (gateway, queue) = gateway();
        gateway.enqueue("a").await.unwrap();
        gateway.enqueue("b").await.unwrap();

        let messages = gateway.receive_up_to(2).await.unwrap();
        assert_eq!(queue.in_flight_len(), 2);

        let handles: Vec<String> =
            messages.iter().map(|m| m.receipt_handle.clone()).collect();
        gateway.delete_many(&handles).await.unwrap();
        assert_eq!(queue.in_flight_len(), 0);
        assert_eq!(queue.ready_len(), 0);
    }

    #[tokio::test]
    async fn test_undeleted_messages_redeliver() {
        // at-least-once: skipping the delete means redelivery after the
        // visibility timeout, here simulated explicitly
        let (gateway, queue) = gateway();
        gateway.enqueue("tile").await.unwrap();

        let first = gateway.receive_up_to(1).await.unwrap();
        assert_eq!(first.len(), 1);
        assert!(gateway.receive_up_to(1).await.unwrap().is_empty());

        queue.expire_in_flight();
        let second = gateway.receive_up_to(1).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].body, "tile");
        // a fresh delivery carries a fresh receipt handle
        assert_ne!(second[0].receipt_handle, first[0].receipt_handle);
    }

    #[tokio::test]
    async fn test_delete_with_stale_handle_fails() {
        let (gateway, queue) = gateway();
        gateway.enqueue("tile").await.unwrap();
        let messages = gateway.receive_up_to(1).await.unwrap();

        queue.expire_in_flight();
        let err = gateway
            .delete_many(&[messages[0].receipt_handle.clone()])
            .await
            .unwrap_err();
        assert!(matches!(err, QueueError::InvalidReceipt(_)));
    }
}
