//! Health & readiness handlers for the preview server.
//!
//! - GET /healthz  -> simple liveness ("ok")
//! - GET /readyz   -> readiness plus the number of live object URLs

use crate::services::preview_registry::PreviewRegistry;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

/// `GET /healthz`
///
/// Always 200 with a plain JSON body. Never touches the registry.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

/// `GET /readyz`
pub async fn readyz(State(registry): State<PreviewRegistry>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ReadyResponse {
            status: "ok".into(),
            base_url: registry.base_url().to_string(),
            live_urls: registry.live_count(),
        }),
    )
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: String,
    base_url: String,
    live_urls: usize,
}
