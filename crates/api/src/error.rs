//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cart::CartError;
use checkout::{CheckoutError, GatewayError};
use doc_store::StoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Cart operation error.
    Cart(CartError),
    /// Checkout operation error.
    Checkout(CheckoutError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Cart(err) => cart_error_to_response(err),
            ApiError::Checkout(err) => checkout_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn cart_error_to_response(err: CartError) -> (StatusCode, String) {
    match &err {
        CartError::AuthRequired => (StatusCode::UNAUTHORIZED, err.to_string()),
        CartError::InvalidIncrement { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        CartError::Store(store_err) => store_error_to_response(store_err, &err),
    }
}

fn checkout_error_to_response(err: CheckoutError) -> (StatusCode, String) {
    match &err {
        CheckoutError::EmptyCart => (StatusCode::BAD_REQUEST, err.to_string()),
        CheckoutError::InvalidTransition { .. } => (StatusCode::CONFLICT, err.to_string()),
        CheckoutError::Declined(_) | CheckoutError::Gateway(GatewayError::Declined(_)) => {
            (StatusCode::PAYMENT_REQUIRED, err.to_string())
        }
        CheckoutError::Gateway(GatewayError::Unavailable(_)) => {
            (StatusCode::SERVICE_UNAVAILABLE, err.to_string())
        }
        CheckoutError::Cart(cart_err) => match cart_err {
            CartError::AuthRequired => (StatusCode::UNAUTHORIZED, err.to_string()),
            CartError::InvalidIncrement { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
            CartError::Store(store_err) => store_error_to_response(store_err, &err),
        },
    }
}

fn store_error_to_response(
    store_err: &StoreError,
    err: &dyn std::fmt::Display,
) -> (StatusCode, String) {
    match store_err {
        StoreError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
        _ => {
            tracing::error!(error = %err, "document store failure");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        ApiError::Cart(err)
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Cart(CartError::Store(err))
    }
}
