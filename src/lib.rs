//! TileFleet - distributed tile-level image inference
//!
//! This library splits large images into fixed-size tiles, distributes
//! tile inference work across a pool of cloud compute tasks through a
//! durable queue, and reassembles worker outputs into full-resolution
//! results.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐   tiles + meta   ┌──────────────┐   tile keys   ┌─────────┐
//! │ Producer │ ───────────────► │ object store │ ◄──────────── │ Workers │
//! └──────────┘                  └──────────────┘   masks       └─────────┘
//!       │                              ▲                            ▲
//!       │ one message per tile   ┌───────────┐     receive/ack      │
//!       └──────────────────────► │   queue   │ ◄────────────────────┘
//!                                └───────────┘
//!                  ┌───────────┐
//!                  │ Collector │ ◄── meta + masks ── object store
//!                  └───────────┘
//! ```
//!
//! Producer, worker, and collector are separate processes sharing no
//! in-process state; the [`fleet`] module scales the worker pool out on
//! an external compute scheduler. Backends (object store, queue,
//! scheduler, model) are injected through capability traits, so every
//! component runs against test doubles as easily as against real
//! services.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tilefleet::config::PipelineConfig;
//! use tilefleet::pipeline::Producer;
//! use tilefleet::queue::QueueGateway;
//! use tilefleet::store::ObjectStoreGateway;
//!
//! let store = ObjectStoreGateway::new(Arc::new(my_store), "tiles-bucket");
//! let queue = QueueGateway::new(Arc::new(my_queue));
//! let producer = Producer::new(store, queue, PipelineConfig::default(), "/tmp/work");
//!
//! let meta = producer.prepare_group("group-a", &image).await?;
//! ```

pub mod codec;
pub mod config;
pub mod fleet;
pub mod infer;
pub mod logging;
pub mod meta;
pub mod pipeline;
pub mod queue;
pub mod store;

/// Version of the tilefleet library.
///
/// Defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
