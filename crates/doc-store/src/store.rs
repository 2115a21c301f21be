use std::sync::Arc;

use async_trait::async_trait;

use crate::{CollectionId, Document, Result, subscription::Subscription};

/// Outcome of an atomic read-modify-write, returned by the update closure.
#[derive(Debug)]
pub enum Mutation {
    /// Leave the document as it is; no write is performed.
    Keep,

    /// Upsert the document with the given contents.
    Put(serde_json::Value),

    /// Delete the document.
    Delete,
}

/// Closure applied to the current document state inside [`DocumentStore::update`].
pub type UpdateFn = Box<dyn FnOnce(Option<&Document>) -> Mutation + Send>;

/// Core trait for document store implementations.
///
/// All implementations must be thread-safe (Send + Sync). Writes to a
/// collection are observed by its subscribers as fresh full snapshots.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Lists all documents in a collection, ordered by document ID.
    async fn list(&self, collection: &CollectionId) -> Result<Vec<Document>>;

    /// Retrieves a single document, or None if it does not exist.
    async fn get(&self, collection: &CollectionId, id: &str) -> Result<Option<Document>>;

    /// Upserts a document, replacing any existing contents.
    ///
    /// Returns the stored document with its assigned write timestamp.
    async fn put(
        &self,
        collection: &CollectionId,
        id: &str,
        data: serde_json::Value,
    ) -> Result<Document>;

    /// Deletes a document. Deleting an absent document is not an error.
    async fn delete(&self, collection: &CollectionId, id: &str) -> Result<()>;

    /// Atomically reads the current document, applies `f`, and persists the
    /// returned [`Mutation`].
    ///
    /// The closure runs under the store's write exclusion for the document,
    /// so concurrent updates to the same document cannot interleave and lose
    /// increments. Returns the document state after the mutation.
    async fn update(
        &self,
        collection: &CollectionId,
        id: &str,
        f: UpdateFn,
    ) -> Result<Option<Document>>;

    /// Removes every document in a collection.
    async fn clear(&self, collection: &CollectionId) -> Result<()>;

    /// Subscribes to snapshot notifications for a collection.
    ///
    /// The subscription yields the current snapshot first, then a fresh full
    /// snapshot after any change. Rapid change bursts may coalesce into the
    /// latest snapshot.
    async fn subscribe(&self, collection: &CollectionId) -> Result<Subscription>;
}

// Forwarding impl so services can be built over `Arc<dyn DocumentStore>`.
#[async_trait]
impl<T: DocumentStore + ?Sized> DocumentStore for Arc<T> {
    async fn list(&self, collection: &CollectionId) -> Result<Vec<Document>> {
        (**self).list(collection).await
    }

    async fn get(&self, collection: &CollectionId, id: &str) -> Result<Option<Document>> {
        (**self).get(collection, id).await
    }

    async fn put(
        &self,
        collection: &CollectionId,
        id: &str,
        data: serde_json::Value,
    ) -> Result<Document> {
        (**self).put(collection, id, data).await
    }

    async fn delete(&self, collection: &CollectionId, id: &str) -> Result<()> {
        (**self).delete(collection, id).await
    }

    async fn update(
        &self,
        collection: &CollectionId,
        id: &str,
        f: UpdateFn,
    ) -> Result<Option<Document>> {
        (**self).update(collection, id, f).await
    }

    async fn clear(&self, collection: &CollectionId) -> Result<()> {
        (**self).clear(collection).await
    }

    async fn subscribe(&self, collection: &CollectionId) -> Result<Subscription> {
        (**self).subscribe(collection).await
    }
}
