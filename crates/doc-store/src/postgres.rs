use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row, postgres::PgRow};
use tokio::sync::{RwLock, watch};

use crate::{
    CollectionId, Document, Result,
    store::{DocumentStore, Mutation, UpdateFn},
    subscription::Subscription,
};

/// PostgreSQL-backed document store implementation.
///
/// Documents live in a single `documents` table keyed by
/// `(principal, collection, id)`. Snapshot notifications are published per
/// process after each committed write; a deployment with multiple writers
/// would hook the store's own change feed instead.
#[derive(Clone)]
pub struct PostgresDocumentStore {
    pool: PgPool,
    channels: Arc<RwLock<HashMap<CollectionId, watch::Sender<Vec<Document>>>>>,
}

impl PostgresDocumentStore {
    /// Creates a new PostgreSQL document store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            channels: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Connects to the database and runs migrations.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPool::connect(url).await?;
        let store = Self::new(pool);
        store.run_migrations().await?;
        Ok(store)
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_document(row: PgRow) -> Result<Document> {
        Ok(Document {
            id: row.try_get("id")?,
            data: row.try_get("data")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    async fn fetch_snapshot(&self, collection: &CollectionId) -> Result<Vec<Document>> {
        let rows = sqlx::query(
            "SELECT id, data, updated_at FROM documents \
             WHERE principal = $1 AND collection = $2 ORDER BY id",
        )
        .bind(collection.principal().as_str())
        .bind(collection.name())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_document).collect()
    }

    /// Publishes a fresh snapshot to local subscribers of the collection.
    async fn publish(&self, collection: &CollectionId) -> Result<()> {
        let tx = {
            let channels = self.channels.read().await;
            channels.get(collection).cloned()
        };

        if let Some(tx) = tx {
            let snapshot = self.fetch_snapshot(collection).await?;
            tx.send_replace(snapshot);
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn list(&self, collection: &CollectionId) -> Result<Vec<Document>> {
        self.fetch_snapshot(collection).await
    }

    async fn get(&self, collection: &CollectionId, id: &str) -> Result<Option<Document>> {
        let row = sqlx::query(
            "SELECT id, data, updated_at FROM documents \
             WHERE principal = $1 AND collection = $2 AND id = $3",
        )
        .bind(collection.principal().as_str())
        .bind(collection.name())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_document).transpose()
    }

    #[tracing::instrument(skip(self, data), fields(collection = %collection))]
    async fn put(
        &self,
        collection: &CollectionId,
        id: &str,
        data: serde_json::Value,
    ) -> Result<Document> {
        let doc = Document {
            id: id.to_string(),
            data,
            updated_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO documents (principal, collection, id, data, updated_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (principal, collection, id) \
             DO UPDATE SET data = EXCLUDED.data, updated_at = EXCLUDED.updated_at",
        )
        .bind(collection.principal().as_str())
        .bind(collection.name())
        .bind(&doc.id)
        .bind(&doc.data)
        .bind(doc.updated_at)
        .execute(&self.pool)
        .await?;

        self.publish(collection).await?;
        Ok(doc)
    }

    #[tracing::instrument(skip(self), fields(collection = %collection))]
    async fn delete(&self, collection: &CollectionId, id: &str) -> Result<()> {
        let result = sqlx::query(
            "DELETE FROM documents WHERE principal = $1 AND collection = $2 AND id = $3",
        )
        .bind(collection.principal().as_str())
        .bind(collection.name())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            self.publish(collection).await?;
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, f), fields(collection = %collection))]
    async fn update(
        &self,
        collection: &CollectionId,
        id: &str,
        f: UpdateFn,
    ) -> Result<Option<Document>> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes concurrent updates to the same document.
        let row = sqlx::query(
            "SELECT id, data, updated_at FROM documents \
             WHERE principal = $1 AND collection = $2 AND id = $3 FOR UPDATE",
        )
        .bind(collection.principal().as_str())
        .bind(collection.name())
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let current = row.map(Self::row_to_document).transpose()?;

        match f(current.as_ref()) {
            Mutation::Keep => {
                tx.commit().await?;
                Ok(current)
            }
            Mutation::Put(data) => {
                let doc = Document {
                    id: id.to_string(),
                    data,
                    updated_at: Utc::now(),
                };
                sqlx::query(
                    "INSERT INTO documents (principal, collection, id, data, updated_at) \
                     VALUES ($1, $2, $3, $4, $5) \
                     ON CONFLICT (principal, collection, id) \
                     DO UPDATE SET data = EXCLUDED.data, updated_at = EXCLUDED.updated_at",
                )
                .bind(collection.principal().as_str())
                .bind(collection.name())
                .bind(&doc.id)
                .bind(&doc.data)
                .bind(doc.updated_at)
                .execute(&mut *tx)
                .await?;
                tx.commit().await?;

                self.publish(collection).await?;
                Ok(Some(doc))
            }
            Mutation::Delete => {
                let result = sqlx::query(
                    "DELETE FROM documents \
                     WHERE principal = $1 AND collection = $2 AND id = $3",
                )
                .bind(collection.principal().as_str())
                .bind(collection.name())
                .bind(id)
                .execute(&mut *tx)
                .await?;
                tx.commit().await?;

                if result.rows_affected() > 0 {
                    self.publish(collection).await?;
                }
                Ok(None)
            }
        }
    }

    #[tracing::instrument(skip(self), fields(collection = %collection))]
    async fn clear(&self, collection: &CollectionId) -> Result<()> {
        let result =
            sqlx::query("DELETE FROM documents WHERE principal = $1 AND collection = $2")
                .bind(collection.principal().as_str())
                .bind(collection.name())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() > 0 {
            self.publish(collection).await?;
        }
        Ok(())
    }

    async fn subscribe(&self, collection: &CollectionId) -> Result<Subscription> {
        let snapshot = self.fetch_snapshot(collection).await?;

        let mut channels = self.channels.write().await;
        let tx = channels
            .entry(collection.clone())
            .or_insert_with(|| watch::channel(Vec::new()).0);
        tx.send_replace(snapshot);
        Ok(Subscription::new(tx.subscribe()))
    }
}
