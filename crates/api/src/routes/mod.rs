//! HTTP route handlers and shared application state.

pub mod cart;
pub mod checkout;
pub mod health;
pub mod metrics;
pub mod products;

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::HeaderMap;
use ::cart::{CartService, PricingConfig, StaticSession};
use ::checkout::{CheckoutService, SimulatedGateway};
use common::PrincipalId;
use doc_store::DocumentStore;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::error::ApiError;

/// Header carrying the signed-in principal, set by the auth proxy in front
/// of this service.
pub const PRINCIPAL_HEADER: &str = "x-principal-id";

type Checkout<S> = CheckoutService<S, StaticSession, SimulatedGateway>;

/// Shared application state accessible from all handlers.
pub struct AppState<S> {
    pub store: S,
    pub gateway: SimulatedGateway,
    pub pricing: PricingConfig,
    /// One long-lived checkout flow per principal, created on first use.
    checkouts: Mutex<HashMap<PrincipalId, Arc<Checkout<S>>>>,
}

impl<S: DocumentStore + Clone + 'static> AppState<S> {
    pub fn new(store: S, gateway: SimulatedGateway, pricing: PricingConfig) -> Self {
        Self {
            store,
            gateway,
            pricing,
            checkouts: Mutex::new(HashMap::new()),
        }
    }

    /// Builds a cart service bound to the request's principal (or anonymous).
    pub fn cart_service(&self, principal: Option<PrincipalId>) -> CartService<S, StaticSession> {
        let session = match principal {
            Some(principal) => StaticSession::signed_in(principal),
            None => StaticSession::anonymous(),
        };
        CartService::new(self.store.clone(), session, self.pricing)
    }

    /// Returns the principal's checkout flow if one has been started.
    pub async fn existing_checkout(&self, principal: &PrincipalId) -> Option<Arc<Checkout<S>>> {
        self.checkouts.lock().await.get(principal).cloned()
    }

    /// Drops the principal's checkout flow.
    pub async fn evict_checkout(&self, principal: &PrincipalId) {
        self.checkouts.lock().await.remove(principal);
    }

    /// Returns the number of live checkout flows.
    pub async fn checkout_count(&self) -> usize {
        self.checkouts.lock().await.len()
    }

    /// Returns the principal's checkout flow, creating it on first use.
    /// Only transition handlers materialize a flow; reads use
    /// [`existing_checkout`](Self::existing_checkout) so a bare GET never
    /// retains state for an arbitrary header value.
    pub async fn checkout_for(&self, principal: PrincipalId) -> Arc<Checkout<S>> {
        let mut checkouts = self.checkouts.lock().await;
        checkouts
            .entry(principal.clone())
            .or_insert_with(|| {
                let cart = CartService::new(
                    self.store.clone(),
                    StaticSession::signed_in(principal),
                    self.pricing,
                );
                Arc::new(CheckoutService::new(cart, self.gateway.clone()))
            })
            .clone()
    }
}

/// Extracts the principal from the request headers, if any.
pub fn principal_from(headers: &HeaderMap) -> Option<PrincipalId> {
    headers
        .get(PRINCIPAL_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(PrincipalId::new)
}

/// Extracts the principal or fails with 401.
pub fn require_principal(headers: &HeaderMap) -> Result<PrincipalId, ApiError> {
    principal_from(headers).ok_or(ApiError::Cart(::cart::CartError::AuthRequired))
}

/// Order summary in response bodies, all amounts in cents.
#[derive(Serialize)]
pub struct SummaryResponse {
    pub subtotal_cents: i64,
    pub shipping_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
}

impl From<::cart::OrderSummary> for SummaryResponse {
    fn from(summary: ::cart::OrderSummary) -> Self {
        Self {
            subtotal_cents: summary.subtotal.cents(),
            shipping_cents: summary.shipping.cents(),
            tax_cents: summary.tax.cents(),
            total_cents: summary.total.cents(),
        }
    }
}
