//! Product editor endpoints.
//!
//! Each principal maintains their own `products` collection; documents are
//! stored as-is, the same loosely-typed shape the cart normalizes on read.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use chrono::{DateTime, Utc};
use doc_store::{CollectionId, Document, DocumentStore};
use serde::Serialize;

use super::{AppState, require_principal};
use crate::error::ApiError;

const PRODUCTS_COLLECTION: &str = "products";

#[derive(Serialize)]
pub struct ProductDocResponse {
    pub id: String,
    pub data: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

impl From<Document> for ProductDocResponse {
    fn from(doc: Document) -> Self {
        Self {
            id: doc.id,
            data: doc.data,
            updated_at: doc.updated_at,
        }
    }
}

fn collection(headers: &HeaderMap) -> Result<CollectionId, ApiError> {
    let principal = require_principal(headers)?;
    Ok(CollectionId::new(principal, PRODUCTS_COLLECTION))
}

fn require_object(data: &serde_json::Value) -> Result<(), ApiError> {
    if data.is_object() {
        Ok(())
    } else {
        Err(ApiError::BadRequest(
            "product document must be a JSON object".to_string(),
        ))
    }
}

/// GET /products — list the principal's product documents.
#[tracing::instrument(skip(state, headers))]
pub async fn list<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
) -> Result<Json<Vec<ProductDocResponse>>, ApiError> {
    let docs = state.store.list(&collection(&headers)?).await?;
    Ok(Json(docs.into_iter().map(Into::into).collect()))
}

/// GET /products/:id — fetch one product document.
#[tracing::instrument(skip(state, headers))]
pub async fn get<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ProductDocResponse>, ApiError> {
    let doc = state
        .store
        .get(&collection(&headers)?, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no product with id {id}")))?;
    Ok(Json(doc.into()))
}

/// POST /products — create a product document with a generated id.
#[tracing::instrument(skip(state, headers, data))]
pub async fn create<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Json(data): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<ProductDocResponse>), ApiError> {
    require_object(&data)?;
    let id = uuid::Uuid::new_v4().to_string();
    let doc = state.store.put(&collection(&headers)?, &id, data).await?;
    Ok((StatusCode::CREATED, Json(doc.into())))
}

/// PUT /products/:id — create or replace a product document.
#[tracing::instrument(skip(state, headers, data))]
pub async fn put<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(data): Json<serde_json::Value>,
) -> Result<Json<ProductDocResponse>, ApiError> {
    require_object(&data)?;
    let doc = state.store.put(&collection(&headers)?, &id, data).await?;
    Ok(Json(doc.into()))
}

/// DELETE /products/:id — delete a product document (idempotent).
#[tracing::instrument(skip(state, headers))]
pub async fn delete<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.store.delete(&collection(&headers)?, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
