//! HTTP handlers serving registered preview blobs.
//! Bodies are held in memory by the registry, so GET answers from a cheap
//! `Bytes` clone and HEAD shares the header logic.

use crate::{
    errors::AppError,
    services::preview_registry::{PreviewObject, PreviewRegistry},
};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::Response,
};
use uuid::Uuid;

/// GET `/preview/{id}`: the blob behind an object URL.
pub async fn get_preview(
    State(registry): State<PreviewRegistry>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let object = lookup(&registry, &id)?;
    let mut response = Response::new(Body::from(object.blob.bytes.clone()));
    *response.status_mut() = StatusCode::OK;
    set_preview_headers(response.headers_mut(), &object);
    Ok(response)
}

/// HEAD `/preview/{id}`: same headers as GET but no body.
pub async fn head_preview(
    State(registry): State<PreviewRegistry>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let object = lookup(&registry, &id)?;
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::OK;
    set_preview_headers(response.headers_mut(), &object);
    Ok(response)
}

fn lookup(registry: &PreviewRegistry, id: &str) -> Result<PreviewObject, AppError> {
    let id = Uuid::parse_str(id).map_err(|_| AppError::bad_request("Invalid preview id"))?;
    registry
        .get(&id)
        .ok_or_else(|| AppError::not_found("Preview not found"))
}

fn set_preview_headers(headers: &mut HeaderMap, object: &PreviewObject) {
    let content_type = if object.blob.mime_type.is_empty() {
        "application/octet-stream"
    } else {
        object.blob.mime_type.as_str()
    };
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );

    headers.insert(
        header::CONTENT_LENGTH,
        HeaderValue::from_str(&object.blob.len().to_string())
            .unwrap_or_else(|_| HeaderValue::from_static("0")),
    );

    let quoted = format!("\"{}\"", object.etag);
    if let Ok(value) = HeaderValue::from_str(&quoted) {
        headers.insert(header::ETAG, value);
    }

    if let Ok(value) = HeaderValue::from_str(&object.created_at.to_rfc2822()) {
        headers.insert(header::LAST_MODIFIED, value);
    }
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
}
