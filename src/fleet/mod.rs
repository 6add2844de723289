//! Fleet controller.
//!
//! Launches bounded batches of worker compute tasks against an external
//! scheduler and polls their statuses until a caller-supplied stop
//! predicate holds or a deadline passes. The [`TaskScheduler`] trait is
//! the backend capability contract; [`FleetController`] owns the generic
//! launch/poll plumbing.

mod controller;
mod types;

pub use controller::{
    FleetController, DEFAULT_POLL_INTERVAL, DEFAULT_WAIT_TIMEOUT, LAUNCH_BATCH_PAUSE,
    MAX_TASKS_PER_LAUNCH, MAX_TASKS_PER_REQUEST,
};
pub use types::{
    status_counts, FleetError, SchedulerError, TaskId, TaskScheduler, TaskStatus, TaskTemplate,
};
