//! Document store abstraction over the external persistence service.
//!
//! Collections are keyed by principal and collection name, documents are
//! loosely typed JSON values. Every implementation supports snapshot
//! subscriptions that push the full collection on any change.

pub mod document;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;
pub mod subscription;

pub use document::{CollectionId, Document};
pub use error::{Result, StoreError};
pub use memory::InMemoryDocumentStore;
pub use postgres::PostgresDocumentStore;
pub use store::{DocumentStore, Mutation, UpdateFn};
pub use subscription::{SnapshotStream, Subscription};
