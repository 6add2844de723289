//! Fleet task types and the scheduler capability trait.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Opaque identifier of a launched compute task.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Point-in-time status of one task.
///
/// The status string follows the external scheduler's lifecycle (for
/// example `PENDING` → `RUNNING` → `STOPPED`). The controller never
/// interprets it — completion semantics live in the caller's stop
/// predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStatus {
    pub id: TaskId,
    pub status: String,
}

/// Launch template for worker tasks: which cluster to run on and which
/// task definition to instantiate. Interpretation is entirely up to the
/// scheduler backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskTemplate {
    pub cluster: String,
    pub definition: String,
}

impl TaskTemplate {
    pub fn new(cluster: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
            definition: definition.into(),
        }
    }
}

/// Errors from the scheduler backend.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("scheduler backend error: {0}")]
    Backend(String),
}

/// Errors from fleet control operations.
#[derive(Debug, Error)]
pub enum FleetError {
    /// Invalid request, detected before any task is launched.
    #[error("validation error: {0}")]
    Validation(String),

    /// Scheduler call failed.
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    /// The wait deadline elapsed before the stop predicate held.
    #[error("timed out after {0:?} waiting for fleet stop condition")]
    Timeout(Duration),

    /// The wait was aborted through the cancellation token.
    #[error("fleet wait cancelled")]
    Cancelled,
}

/// Capability trait for the external compute scheduler.
///
/// One `launch` call starts at most
/// [`MAX_TASKS_PER_LAUNCH`](super::MAX_TASKS_PER_LAUNCH) tasks — an
/// external limit the controller batches around. `describe` reports
/// current task statuses.
pub trait TaskScheduler: Send + Sync {
    /// Launches `count` tasks from a template, returning their ids.
    fn launch(
        &self,
        count: usize,
        template: &TaskTemplate,
    ) -> impl Future<Output = Result<Vec<TaskId>, SchedulerError>> + Send;

    /// Reports the current status of each task.
    fn describe(
        &self,
        ids: &[TaskId],
    ) -> impl Future<Output = Result<Vec<TaskStatus>, SchedulerError>> + Send;
}

/// Tallies statuses by value, for logging and stop predicates.
///
/// A predicate like "at least K tasks stopped" is one lookup:
/// `status_counts(statuses).get("STOPPED").copied().unwrap_or(0) >= k`.
pub fn status_counts(statuses: &[TaskStatus]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for status in statuses {
        *counts.entry(status.status.as_str()).or_insert(0) += 1;
    }
    counts
}
