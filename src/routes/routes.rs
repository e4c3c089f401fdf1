//! Routes of the local preview server.
//!
//! - `GET  /healthz`       liveness
//! - `GET  /readyz`        readiness and live URL count
//! - `GET  /preview/{id}`  blob behind an object URL
//! - `HEAD /preview/{id}`  headers only

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        preview_handlers::{get_preview, head_preview},
    },
    services::preview_registry::PreviewRegistry,
};
use axum::{Router, routing::get};

/// Build the preview router. State is the registry the object URLs point into.
pub fn routes() -> Router<PreviewRegistry> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/preview/{id}", get(get_preview).head(head_preview))
}
