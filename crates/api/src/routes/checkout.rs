//! Checkout endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use checkout::{CheckoutState, OrderReceipt};
use chrono::{DateTime, Utc};
use doc_store::DocumentStore;
use serde::Serialize;

use super::{AppState, SummaryResponse, require_principal};
use crate::error::ApiError;

// -- Response types --

#[derive(Serialize)]
pub struct CheckoutResponse {
    pub step: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed: Option<SummaryResponse>,
}

impl From<CheckoutState> for CheckoutResponse {
    fn from(state: CheckoutState) -> Self {
        Self {
            step: state.step.to_string(),
            reviewed: state.reviewed.map(SummaryResponse::from),
        }
    }
}

#[derive(Serialize)]
pub struct ReceiptResponse {
    pub order_id: String,
    pub payment_id: String,
    pub summary: SummaryResponse,
    pub placed_at: DateTime<Utc>,
}

impl From<OrderReceipt> for ReceiptResponse {
    fn from(receipt: OrderReceipt) -> Self {
        Self {
            order_id: receipt.order_id.to_string(),
            payment_id: receipt.payment_id,
            summary: receipt.summary.into(),
            placed_at: receipt.placed_at,
        }
    }
}

// -- Handlers --

/// GET /checkout — the principal's current checkout step.
///
/// A principal with no live flow is on the shipping step; reading the state
/// does not materialize a flow.
#[tracing::instrument(skip(state, headers))]
pub async fn get_state<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let principal = require_principal(&headers)?;
    match state.existing_checkout(&principal).await {
        Some(checkout) => Ok(Json(checkout.state().await.into())),
        None => Ok(Json(CheckoutResponse {
            step: checkout::CheckoutStep::default().to_string(),
            reviewed: None,
        })),
    }
}

/// POST /checkout/advance — move one step forward.
#[tracing::instrument(skip(state, headers))]
pub async fn advance<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let principal = require_principal(&headers)?;
    let checkout = state.checkout_for(principal).await;
    Ok(Json(checkout.advance().await?.into()))
}

/// POST /checkout/back — move one step backward.
#[tracing::instrument(skip(state, headers))]
pub async fn back<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let principal = require_principal(&headers)?;
    let checkout = state.checkout_for(principal).await;
    Ok(Json(checkout.go_back().await?.into()))
}

/// POST /checkout/place-order — charge the reviewed total and settle.
#[tracing::instrument(skip(state, headers))]
pub async fn place_order<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
) -> Result<(axum::http::StatusCode, Json<ReceiptResponse>), ApiError> {
    let principal = require_principal(&headers)?;
    let checkout = state.checkout_for(principal).await;
    let receipt = checkout.place_order().await?;
    Ok((axum::http::StatusCode::CREATED, Json(receipt.into())))
}

/// POST /checkout/reset — return the flow to the shipping step.
///
/// The flow is dropped from the server entirely; a reset principal is
/// indistinguishable from one who never started checking out.
#[tracing::instrument(skip(state, headers))]
pub async fn reset<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let principal = require_principal(&headers)?;
    if let Some(checkout) = state.existing_checkout(&principal).await {
        // Waits for any in-flight settlement before the flow is dropped.
        checkout.reset().await;
        state.evict_checkout(&principal).await;
    }
    Ok(Json(CheckoutResponse {
        step: checkout::CheckoutStep::default().to_string(),
        reviewed: None,
    }))
}
