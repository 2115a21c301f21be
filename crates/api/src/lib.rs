//! HTTP API server with observability for the cart/checkout system.
//!
//! Provides REST endpoints for cart management, checkout step transitions,
//! and the product editor, with structured logging (tracing) and Prometheus
//! metrics. Cart changes are also available as a server-sent event stream.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, patch, post, put};
use cart::PricingConfig;
use checkout::SimulatedGateway;
use doc_store::DocumentStore;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: DocumentStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/cart", get(routes::cart::get_cart::<S>))
        .route("/cart", delete(routes::cart::clear::<S>))
        .route("/cart/watch", get(routes::cart::watch::<S>))
        .route("/cart/items", post(routes::cart::add_item::<S>))
        .route("/cart/items/{id}", patch(routes::cart::change_quantity::<S>))
        .route("/cart/items/{id}", delete(routes::cart::remove_item::<S>))
        .route("/checkout", get(routes::checkout::get_state::<S>))
        .route("/checkout/advance", post(routes::checkout::advance::<S>))
        .route("/checkout/back", post(routes::checkout::back::<S>))
        .route(
            "/checkout/place-order",
            post(routes::checkout::place_order::<S>),
        )
        .route("/checkout/reset", post(routes::checkout::reset::<S>))
        .route("/products", get(routes::products::list::<S>))
        .route("/products", post(routes::products::create::<S>))
        .route("/products/{id}", get(routes::products::get::<S>))
        .route("/products/{id}", put(routes::products::put::<S>))
        .route("/products/{id}", delete(routes::products::delete::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state over the given store.
pub fn create_state<S: DocumentStore + Clone + 'static>(
    store: S,
    gateway: SimulatedGateway,
    pricing: PricingConfig,
) -> Arc<AppState<S>> {
    Arc::new(AppState::new(store, gateway, pricing))
}
