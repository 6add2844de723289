//! Object store gateway and key layout.
//!
//! The [`ObjectStore`] trait is the capability contract for a key-value
//! blob backend; [`ObjectStoreGateway`] layers bounded-parallel batch
//! transfers, pagination-driving listing, and prefix deletion on top of
//! it. The [`keys`] submodule pins the object key layout that producer,
//! worker, and collector share.

pub mod keys;

mod gateway;
mod memory;
mod types;

pub use gateway::ObjectStoreGateway;
pub use memory::{InMemoryObjectStore, DEFAULT_PAGE_SIZE};
pub use types::{ListPage, ObjectStore, StoreError};
