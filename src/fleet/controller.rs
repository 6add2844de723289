//! Fleet controller: bounded-batch launch and the poll/timeout wait loop.

use super::types::{
    status_counts, FleetError, TaskId, TaskScheduler, TaskStatus, TaskTemplate,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Maximum tasks one `request_tasks` call may ask for.
pub const MAX_TASKS_PER_REQUEST: usize = 20;

/// Maximum tasks per underlying scheduler `launch` call (external limit).
pub const MAX_TASKS_PER_LAUNCH: usize = 10;

/// Pause between launch batches, guarding against scheduler throttling.
pub const LAUNCH_BATCH_PAUSE: Duration = Duration::from_secs(5);

/// Default interval between status polls in [`FleetController::wait_until`].
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Default overall deadline for [`FleetController::wait_until`].
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(300);

/// Launches worker compute tasks and waits for a caller-defined stop
/// condition.
///
/// The controller owns only the generic plumbing: batching launches under
/// the scheduler's per-call limit, and polling statuses on an interval
/// until a deadline. What "done" means — all tasks stopped, the queue
/// drained, at least K workers finished — is the caller's stop predicate,
/// which keeps the controller reusable across job semantics.
pub struct FleetController<S> {
    scheduler: Arc<S>,
    cancel: CancellationToken,
}

impl<S: TaskScheduler> FleetController<S> {
    /// Creates a controller over a scheduler backend.
    pub fn new(scheduler: Arc<S>) -> Self {
        Self::with_cancellation(scheduler, CancellationToken::new())
    }

    /// Creates a controller whose waits abort when `cancel` is cancelled.
    pub fn with_cancellation(scheduler: Arc<S>, cancel: CancellationToken) -> Self {
        Self { scheduler, cancel }
    }

    /// Token that aborts in-progress waits when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Launches `count` worker tasks, in batches the scheduler accepts.
    ///
    /// Batches are at most [`MAX_TASKS_PER_LAUNCH`] tasks per underlying
    /// call, with a [`LAUNCH_BATCH_PAUSE`] sleep between batches to avoid
    /// throttling. All launched ids are accumulated and returned.
    ///
    /// # Errors
    ///
    /// [`FleetError::Validation`] unless `1 <= count <= 20`, raised before
    /// any task is launched. Scheduler failures surface as
    /// [`FleetError::Scheduler`]; tasks launched by earlier batches are
    /// not torn down.
    pub async fn request_tasks(
        &self,
        count: usize,
        template: &TaskTemplate,
    ) -> Result<Vec<TaskId>, FleetError> {
        if count == 0 || count > MAX_TASKS_PER_REQUEST {
            return Err(FleetError::Validation(format!(
                "task count must be in 1..={MAX_TASKS_PER_REQUEST}, got {count}"
            )));
        }

        let mut ids = Vec::with_capacity(count);
        let mut remaining = count;
        while remaining > 0 {
            let batch = remaining.min(MAX_TASKS_PER_LAUNCH);
            info!(batch, remaining, cluster = %template.cluster, "launching task batch");
            let launched = self.scheduler.launch(batch, template).await?;
            ids.extend(launched);
            remaining -= batch;
            if remaining > 0 {
                tokio::time::sleep(LAUNCH_BATCH_PAUSE).await;
            }
        }
        Ok(ids)
    }

    /// Polls task statuses until the stop predicate holds.
    ///
    /// Every `poll_interval` the scheduler is asked to describe `ids` and
    /// the predicate is evaluated over the statuses. Returns the final
    /// statuses the first time the predicate is true — a predicate true on
    /// the first poll returns immediately without sleeping.
    ///
    /// # Errors
    ///
    /// [`FleetError::Timeout`] when `timeout` elapses before the predicate
    /// holds, [`FleetError::Cancelled`] when the cancellation token fires
    /// mid-wait, and [`FleetError::Scheduler`] on a failed poll.
    pub async fn wait_until<P>(
        &self,
        ids: &[TaskId],
        mut stop_predicate: P,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Result<Vec<TaskStatus>, FleetError>
    where
        P: FnMut(&[TaskStatus]) -> bool,
    {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() >= deadline {
                return Err(FleetError::Timeout(timeout));
            }

            let statuses = self.scheduler.describe(ids).await?;
            debug!(counts = ?status_counts(&statuses), "fleet status poll");
            if stop_predicate(&statuses) {
                return Ok(statuses);
            }

            tokio::select! {
                _ = self.cancel.cancelled() => return Err(FleetError::Cancelled),
                _ = tokio::time::sleep(poll_interval) => {}
            }
        }
    }
}
