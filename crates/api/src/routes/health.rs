//! Liveness endpoint for the storefront API.

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET /health — liveness probe. Always ok while the server is up; the
/// document store's availability surfaces through the cart endpoints, not
/// here.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
