use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::{RwLock, watch};

use crate::{
    CollectionId, Document, Result, StoreError,
    store::{DocumentStore, Mutation, UpdateFn},
    subscription::Subscription,
};

struct CollectionState {
    docs: BTreeMap<String, Document>,
    tx: watch::Sender<Vec<Document>>,
}

impl CollectionState {
    fn new() -> Self {
        let (tx, _rx) = watch::channel(Vec::new());
        Self {
            docs: BTreeMap::new(),
            tx,
        }
    }

    fn snapshot(&self) -> Vec<Document> {
        self.docs.values().cloned().collect()
    }

    fn notify(&self) {
        self.tx.send_replace(self.snapshot());
    }
}

/// In-memory document store implementation for testing and local runs.
///
/// Provides the same interface as the PostgreSQL implementation. The
/// `set_unavailable` hook simulates a persistence outage so callers can
/// exercise their `StoreUnavailable` handling.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<HashMap<CollectionId, CollectionState>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryDocumentStore {
    /// Creates a new empty in-memory document store.
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every operation fails with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Returns the number of documents in a collection.
    pub async fn document_count(&self, collection: &CollectionId) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, |state| state.docs.len())
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable(
                "simulated outage".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn list(&self, collection: &CollectionId) -> Result<Vec<Document>> {
        self.check_available()?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(CollectionState::snapshot)
            .unwrap_or_default())
    }

    async fn get(&self, collection: &CollectionId, id: &str) -> Result<Option<Document>> {
        self.check_available()?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|state| state.docs.get(id))
            .cloned())
    }

    async fn put(
        &self,
        collection: &CollectionId,
        id: &str,
        data: serde_json::Value,
    ) -> Result<Document> {
        self.check_available()?;
        let mut collections = self.collections.write().await;
        let state = collections
            .entry(collection.clone())
            .or_insert_with(CollectionState::new);

        let doc = Document::new(id, data);
        state.docs.insert(id.to_string(), doc.clone());
        state.notify();
        Ok(doc)
    }

    async fn delete(&self, collection: &CollectionId, id: &str) -> Result<()> {
        self.check_available()?;
        let mut collections = self.collections.write().await;
        if let Some(state) = collections.get_mut(collection)
            && state.docs.remove(id).is_some()
        {
            state.notify();
        }
        Ok(())
    }

    async fn update(
        &self,
        collection: &CollectionId,
        id: &str,
        f: UpdateFn,
    ) -> Result<Option<Document>> {
        self.check_available()?;
        let mut collections = self.collections.write().await;
        let state = collections
            .entry(collection.clone())
            .or_insert_with(CollectionState::new);

        let current = state.docs.get(id).cloned();
        match f(current.as_ref()) {
            Mutation::Keep => Ok(current),
            Mutation::Put(data) => {
                let doc = Document::new(id, data);
                state.docs.insert(id.to_string(), doc.clone());
                state.notify();
                Ok(Some(doc))
            }
            Mutation::Delete => {
                if state.docs.remove(id).is_some() {
                    state.notify();
                }
                Ok(None)
            }
        }
    }

    async fn clear(&self, collection: &CollectionId) -> Result<()> {
        self.check_available()?;
        let mut collections = self.collections.write().await;
        if let Some(state) = collections.get_mut(collection)
            && !state.docs.is_empty()
        {
            state.docs.clear();
            state.notify();
        }
        Ok(())
    }

    async fn subscribe(&self, collection: &CollectionId) -> Result<Subscription> {
        self.check_available()?;
        let mut collections = self.collections.write().await;
        let state = collections
            .entry(collection.clone())
            .or_insert_with(CollectionState::new);
        Ok(Subscription::new(state.tx.subscribe()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::PrincipalId;
    use serde_json::json;

    fn cart_of(user: &str) -> CollectionId {
        CollectionId::new(PrincipalId::new(user), "cart")
    }

    #[tokio::test]
    async fn put_and_get_document() {
        let store = InMemoryDocumentStore::new();
        let collection = cart_of("u1");

        store
            .put(&collection, "42", json!({"title": "Widget", "quantity": 2}))
            .await
            .unwrap();

        let doc = store.get(&collection, "42").await.unwrap().unwrap();
        assert_eq!(doc.id, "42");
        assert_eq!(doc.data["title"], "Widget");
    }

    #[tokio::test]
    async fn get_missing_document_returns_none() {
        let store = InMemoryDocumentStore::new();
        assert!(store.get(&cart_of("u1"), "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_replaces_existing_document() {
        let store = InMemoryDocumentStore::new();
        let collection = cart_of("u1");

        store.put(&collection, "42", json!({"quantity": 1})).await.unwrap();
        store.put(&collection, "42", json!({"quantity": 5})).await.unwrap();

        let doc = store.get(&collection, "42").await.unwrap().unwrap();
        assert_eq!(doc.data["quantity"], 5);
        assert_eq!(store.document_count(&collection).await, 1);
    }

    #[tokio::test]
    async fn list_is_ordered_by_id() {
        let store = InMemoryDocumentStore::new();
        let collection = cart_of("u1");

        store.put(&collection, "b", json!({})).await.unwrap();
        store.put(&collection, "a", json!({})).await.unwrap();

        let docs = store.list(&collection).await.unwrap();
        let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn collections_are_isolated_per_principal() {
        let store = InMemoryDocumentStore::new();
        store.put(&cart_of("u1"), "42", json!({})).await.unwrap();

        assert!(store.list(&cart_of("u2")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = InMemoryDocumentStore::new();
        let collection = cart_of("u1");

        store.put(&collection, "42", json!({})).await.unwrap();
        store.delete(&collection, "42").await.unwrap();
        store.delete(&collection, "42").await.unwrap();
        store.delete(&collection, "never-existed").await.unwrap();

        assert_eq!(store.document_count(&collection).await, 0);
    }

    #[tokio::test]
    async fn update_put_modifies_atomically() {
        let store = InMemoryDocumentStore::new();
        let collection = cart_of("u1");
        store.put(&collection, "42", json!({"quantity": 2})).await.unwrap();

        let doc = store
            .update(
                &collection,
                "42",
                Box::new(|current| {
                    let quantity = current
                        .and_then(|d| d.data["quantity"].as_i64())
                        .unwrap_or(0);
                    Mutation::Put(json!({"quantity": quantity + 3}))
                }),
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(doc.data["quantity"], 5);
    }

    #[tokio::test]
    async fn update_keep_leaves_document_and_skips_notification() {
        let store = InMemoryDocumentStore::new();
        let collection = cart_of("u1");
        store.put(&collection, "42", json!({"quantity": 2})).await.unwrap();

        let mut sub = store.subscribe(&collection).await.unwrap();
        assert_eq!(sub.next().await.unwrap().len(), 1);

        let doc = store
            .update(&collection, "42", Box::new(|_| Mutation::Keep))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.data["quantity"], 2);

        // A later real write is the next thing the subscriber sees.
        store.put(&collection, "43", json!({})).await.unwrap();
        assert_eq!(sub.next().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn update_delete_removes_document() {
        let store = InMemoryDocumentStore::new();
        let collection = cart_of("u1");
        store.put(&collection, "42", json!({})).await.unwrap();

        let result = store
            .update(&collection, "42", Box::new(|_| Mutation::Delete))
            .await
            .unwrap();

        assert!(result.is_none());
        assert!(store.get(&collection, "42").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_on_missing_document_can_create() {
        let store = InMemoryDocumentStore::new();
        let collection = cart_of("u1");

        let doc = store
            .update(
                &collection,
                "42",
                Box::new(|current| {
                    assert!(current.is_none());
                    Mutation::Put(json!({"quantity": 1}))
                }),
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(doc.data["quantity"], 1);
    }

    #[tokio::test]
    async fn clear_empties_collection() {
        let store = InMemoryDocumentStore::new();
        let collection = cart_of("u1");
        store.put(&collection, "1", json!({})).await.unwrap();
        store.put(&collection, "2", json!({})).await.unwrap();

        store.clear(&collection).await.unwrap();
        assert!(store.list(&collection).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn subscribe_sees_initial_and_changed_snapshots() {
        let store = InMemoryDocumentStore::new();
        let collection = cart_of("u1");
        store.put(&collection, "42", json!({})).await.unwrap();

        let mut sub = store.subscribe(&collection).await.unwrap();
        assert_eq!(sub.next().await.unwrap().len(), 1);

        store.put(&collection, "43", json!({})).await.unwrap();
        assert_eq!(sub.next().await.unwrap().len(), 2);

        store.delete(&collection, "42").await.unwrap();
        let snapshot = sub.next().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, "43");
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_operation() {
        let store = InMemoryDocumentStore::new();
        let collection = cart_of("u1");
        store.put(&collection, "42", json!({})).await.unwrap();

        store.set_unavailable(true);
        assert!(matches!(
            store.list(&collection).await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(
            store.put(&collection, "43", json!({})).await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(
            store.delete(&collection, "42").await,
            Err(StoreError::Unavailable(_))
        ));

        store.set_unavailable(false);
        assert_eq!(store.list(&collection).await.unwrap().len(), 1);
    }
}
