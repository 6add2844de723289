//! Producer, worker, and collector flows.
//!
//! The three process roles of the system, as library entry points over
//! the gateways:
//!
//! ```text
//! Producer                  Worker (xN)               Collector
//! ────────                  ───────────               ─────────
//! normalize + shrink        receive_up_to(n)          read meta.json
//! slice to tiles            download tiles            list mask tiles
//! write meta.json           predict in <=4 batches    stitch + crop
//! upload tiles              upload masks
//! enqueue tile keys         delete messages
//! ```
//!
//! No state is shared in-process between roles — coordination happens
//! only through the object store, the queue, and the metadata record, so
//! each role can be restarted or retried independently.

mod collector;
mod error;
mod images;
mod producer;
mod worker;

pub use collector::Collector;
pub use error::PipelineError;
pub use producer::Producer;
pub use worker::Worker;
