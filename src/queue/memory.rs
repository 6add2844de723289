//! In-memory work queue.
//!
//! Test double with receipt-handle accounting: received messages move to
//! an in-flight set and stay invisible until deleted or explicitly
//! expired back onto the queue (simulating a visibility timeout).

use super::types::{QueueError, QueueMessage, WorkQueue};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

#[derive(Default)]
struct QueueState {
    ready: VecDeque<String>,
    in_flight: HashMap<String, String>,
    next_receipt: u64,
}

/// In-memory [`WorkQueue`] implementation.
#[derive(Default)]
pub struct InMemoryQueue {
    state: Mutex<QueueState>,
}

impl InMemoryQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages waiting to be received.
    pub fn ready_len(&self) -> usize {
        self.state.lock().unwrap().ready.len()
    }

    /// Messages delivered but not yet deleted.
    pub fn in_flight_len(&self) -> usize {
        self.state.lock().unwrap().in_flight.len()
    }

    /// Returns every in-flight message to the queue, invalidating its
    /// receipt handle — the visibility-timeout expiry a real queue
    /// applies to unacknowledged deliveries.
    pub fn expire_in_flight(&self) {
        let mut state = self.state.lock().unwrap();
        let bodies: Vec<String> = state.in_flight.drain().map(|(_, body)| body).collect();
        for body in bodies {
            state.ready.push_back(body);
        }
    }
}

impl WorkQueue for InMemoryQueue {
    async fn send(&self, body: &str) -> Result<(), QueueError> {
        self.state.lock().unwrap().ready.push_back(body.to_string());
        Ok(())
    }

    async fn receive_one(&self) -> Result<Option<QueueMessage>, QueueError> {
        let mut state = self.state.lock().unwrap();
        let Some(body) = state.ready.pop_front() else {
            return Ok(None);
        };
        state.next_receipt += 1;
        let receipt_handle = format!("receipt-{}", state.next_receipt);
        state.in_flight.insert(receipt_handle.clone(), body.clone());
        Ok(Some(QueueMessage {
            body,
            receipt_handle,
        }))
    }

    async fn delete(&self, receipt_handle: &str) -> Result<(), QueueError> {
        let mut state = self.state.lock().unwrap();
        match state.in_flight.remove(receipt_handle) {
            Some(_) => Ok(()),
            None => Err(QueueError::InvalidReceipt(receipt_handle.to_string())),
        }
    }
}
