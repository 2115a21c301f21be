//! Cart endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use cart::{Cart, CartState, LineItem, Money, OrderSummary, PricingConfig, Product, Variant};
use doc_store::DocumentStore;
use futures_util::Stream;
use futures_util::stream::StreamExt;
use serde::{Deserialize, Serialize};

use super::{AppState, SummaryResponse, principal_from};
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,
    pub title: String,
    pub unit_price_cents: i64,
    pub quantity: Option<u32>,
    pub category: Option<String>,
    pub thumbnail: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
}

#[derive(Deserialize)]
pub struct ChangeQuantityRequest {
    pub delta: i64,
}

// -- Response types --

#[derive(Serialize)]
pub struct LineItemResponse {
    pub product_id: String,
    pub title: String,
    pub unit_price_cents: i64,
    pub quantity: u32,
    pub line_total_cents: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl From<&LineItem> for LineItemResponse {
    fn from(item: &LineItem) -> Self {
        Self {
            product_id: item.product_id.to_string(),
            title: item.title.clone(),
            unit_price_cents: item.unit_price.cents(),
            quantity: item.quantity,
            line_total_cents: item.line_total().cents(),
            category: item.category.clone(),
            thumbnail: item.thumbnail.clone(),
            color: item.variant.color.clone(),
            size: item.variant.size.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct CartResponse {
    pub items: Vec<LineItemResponse>,
    pub read_only: bool,
    pub summary: SummaryResponse,
}

impl CartResponse {
    fn build(cart: &Cart, read_only: bool, pricing: &PricingConfig) -> Self {
        Self {
            items: cart.items().map(LineItemResponse::from).collect(),
            read_only,
            summary: OrderSummary::compute(cart, pricing).into(),
        }
    }
}

// -- Handlers --

/// GET /cart — the current principal's cart with derived totals.
#[tracing::instrument(skip(state, headers))]
pub async fn get_cart<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
) -> Result<Json<CartResponse>, ApiError> {
    let service = state.cart_service(principal_from(&headers));
    let CartState { cart, read_only } = service.load().await?;
    Ok(Json(CartResponse::build(&cart, read_only, &state.pricing)))
}

/// GET /cart/watch — server-sent cart snapshots, starting with the current one.
#[tracing::instrument(skip(state, headers))]
pub async fn watch<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, ApiError> {
    let principal = principal_from(&headers);
    let read_only = principal.is_none();
    let service = state.cart_service(principal);
    let watch = service.watch().await?;
    let pricing = state.pricing;

    let stream = futures_util::stream::unfold(watch, |mut watch| async move {
        let cart = watch.next().await?;
        Some((cart, watch))
    })
    .map(move |cart| {
        Event::default().json_data(CartResponse::build(&cart, read_only, &pricing))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// POST /cart/items — add a product, accumulating onto an existing line item.
#[tracing::instrument(skip(state, headers, req), fields(product_id = %req.product_id))]
pub async fn add_item<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Json(req): Json<AddItemRequest>,
) -> Result<StatusCode, ApiError> {
    if req.unit_price_cents < 0 {
        return Err(ApiError::BadRequest(
            "unit_price_cents must not be negative".to_string(),
        ));
    }

    let mut product = Product::new(
        req.product_id.as_str(),
        req.title.as_str(),
        Money::from_cents(req.unit_price_cents),
    );
    product.category = req.category;
    product.thumbnail = req.thumbnail;

    let variant = if req.color.is_some() || req.size.is_some() {
        Some(Variant {
            color: req.color,
            size: req.size,
        })
    } else {
        None
    };

    let service = state.cart_service(principal_from(&headers));
    service
        .add_item(&product, variant, req.quantity.unwrap_or(1))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /cart/items/:id — adjust a line item's quantity by a signed delta.
#[tracing::instrument(skip(state, headers, req))]
pub async fn change_quantity<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<ChangeQuantityRequest>,
) -> Result<StatusCode, ApiError> {
    let service = state.cart_service(principal_from(&headers));
    service.change_quantity(&id.into(), req.delta).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /cart/items/:id — remove a line item (idempotent).
#[tracing::instrument(skip(state, headers))]
pub async fn remove_item<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let service = state.cart_service(principal_from(&headers));
    service.remove_item(&id.into()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /cart — empty the cart.
#[tracing::instrument(skip(state, headers))]
pub async fn clear<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let service = state.cart_service(principal_from(&headers));
    service.clear().await?;
    Ok(StatusCode::NO_CONTENT)
}
