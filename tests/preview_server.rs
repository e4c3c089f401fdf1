use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use fabtrack::{
    routes,
    services::{file_backend::Blob, object_urls::ObjectUrlManager, preview_registry::PreviewRegistry},
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

const BASE: &str = "http://127.0.0.1:7070";

fn app(registry: &PreviewRegistry) -> Router {
    routes::routes::routes().with_state(registry.clone())
}

fn path_of(url: &str) -> &str {
    url.strip_prefix(BASE).unwrap()
}

async fn send(registry: &PreviewRegistry, method: Method, uri: &str) -> axum::response::Response {
    app(registry)
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn json_body(res: axum::response::Response) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn serves_registered_blob_with_object_headers() {
    let registry = PreviewRegistry::new(BASE);
    let url = registry.create(Blob::new(b"%PDF-1.7".to_vec(), "application/pdf"));

    let res = send(&registry, Method::GET, path_of(&url)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let headers = res.headers().clone();
    assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(headers[header::CONTENT_LENGTH], "8");
    assert_eq!(
        headers[header::ETAG],
        format!("\"{:x}\"", md5::compute(b"%PDF-1.7")).as_str()
    );
    assert!(headers.contains_key(header::LAST_MODIFIED));

    let body = res.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"%PDF-1.7");
}

#[tokio::test]
async fn head_has_headers_but_no_body() {
    let registry = PreviewRegistry::new(BASE);
    let url = registry.create(Blob::new(b"png!".to_vec(), "image/png"));

    let res = send(&registry, Method::HEAD, path_of(&url)).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[header::CONTENT_LENGTH], "4");
    let body = res.into_body().collect().await.unwrap().to_bytes();
    assert!(body.is_empty());
}

#[tokio::test]
async fn released_url_is_gone() {
    let registry = PreviewRegistry::new(BASE);
    let url = registry.create(Blob::new(b"x".to_vec(), "image/png"));
    registry.release(&url);

    let res = send(&registry, Method::GET, path_of(&url)).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = json_body(res).await;
    assert_eq!(body["error"], "Preview not found");
    assert_eq!(body["status"], 404);
}

#[tokio::test]
async fn malformed_id_is_a_bad_request() {
    let registry = PreviewRegistry::new(BASE);
    let res = send(&registry, Method::GET, "/preview/not-a-uuid").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn readyz_reports_live_urls() {
    let registry = PreviewRegistry::new(BASE);
    registry.create(Blob::new(b"a".to_vec(), "image/png"));
    registry.create(Blob::new(b"b".to_vec(), "image/png"));

    let res = send(&registry, Method::GET, "/readyz").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["live_urls"], 2);

    let res = send(&registry, Method::GET, "/healthz").await;
    assert_eq!(json_body(res).await["status"], "ok");
}
