//! End-to-end redirect behavior through the full router.
//!
//! Each test writes a `config.json` record into a temporary data directory, builds
//! the router, and sends a single request with a chosen Host header.

use std::path::Path;

use axum::body::{to_bytes, Body};
use axum::http::header::{HOST, LOCATION};
use axum::http::{Request, StatusCode};
use axum::Router;
use tempfile::TempDir;
use tower::ServiceExt;

use canonhost::config::AppConfig;
use canonhost::routes::create_router;
use canonhost::state::AppState;
use canonhost::{ConfigProvider, Configuration};

const EC2: &str = "ec2-44-215-70-124.compute-1.amazonaws.com";

fn write_record(dir: &Path, canonical_host: &str) {
    let record = serde_json::to_vec(&Configuration {
        canonical_host: canonical_host.to_string(),
    })
    .unwrap();
    std::fs::write(dir.join("config.json"), record).unwrap();
}

fn router_for(dir: &TempDir) -> Router {
    let config = AppConfig::parse(&format!(
        r#"
        [http]
        host = "127.0.0.1"
        port = 8443

        [data]
        directory = "{}"
        "#,
        dir.path().display()
    ))
    .unwrap();
    let provider = ConfigProvider::from_path(config.data.configuration_path());
    create_router(AppState::with_provider(provider))
}

async fn get(app: Router, host: &str, path: &str) -> axum::response::Response {
    let request = Request::builder()
        .uri(path)
        .header(HOST, host)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

fn location(response: &axum::response::Response) -> &str {
    response.headers().get(LOCATION).unwrap().to_str().unwrap()
}

#[tokio::test]
async fn test_canonical_without_port_request_with_port_redirects() {
    let dir = tempfile::tempdir().unwrap();
    write_record(dir.path(), EC2);

    let response = get(router_for(&dir), &format!("{EC2}:9090"), "/").await;

    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(location(&response), format!("https://{EC2}/"));
}

#[tokio::test]
async fn test_canonical_with_port_request_with_same_port_passes_through() {
    let dir = tempfile::tempdir().unwrap();
    write_record(dir.path(), &format!("{EC2}:9090"));

    let response = get(router_for(&dir), &format!("{EC2}:9090"), "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), 1024).await.unwrap();
    assert_eq!(&body[..], b"ok");
}

#[tokio::test]
async fn test_canonical_with_port_request_without_port_redirects() {
    let dir = tempfile::tempdir().unwrap();
    write_record(dir.path(), &format!("{EC2}:9090"));

    let response = get(router_for(&dir), EC2, "/").await;

    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(location(&response), format!("https://{EC2}:9090/"));
}

#[tokio::test]
async fn test_explicit_default_port_is_not_redirected() {
    let dir = tempfile::tempdir().unwrap();
    write_record(dir.path(), "example.com");

    let response = get(router_for(&dir), "example.com:443", "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_redirect_drops_path_and_query() {
    let dir = tempfile::tempdir().unwrap();
    write_record(dir.path(), "example.com");

    let response = get(router_for(&dir), "www.example.com", "/group/test?lang=en").await;

    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(location(&response), "https://example.com/");
}

#[tokio::test]
async fn test_missing_record_disables_redirects() {
    let dir = tempfile::tempdir().unwrap();

    let response = get(router_for(&dir), "anything.example.com:9090", "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unrouted_path_on_canonical_host_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    write_record(dir.path(), "example.com");

    let response = get(router_for(&dir), "example.com", "/nope").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_record_change_is_picked_up_between_requests() {
    let dir = tempfile::tempdir().unwrap();
    write_record(dir.path(), "example.com");
    let app = router_for(&dir);

    let response = get(app.clone(), "example.com:9090", "/").await;
    assert_eq!(location(&response), "https://example.com/");

    // Longer record, so the size changes even if the mtime does not
    write_record(dir.path(), "example.com:9090");

    let response = get(app, "example.com:9090", "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_malformed_record_keeps_enforcing_last_good_host() {
    let dir = tempfile::tempdir().unwrap();
    write_record(dir.path(), "example.com");
    let app = router_for(&dir);

    let response = get(app.clone(), "example.com", "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    std::fs::write(dir.path().join("config.json"), "{\"CanonicalHost\":").unwrap();

    let response = get(app, "other.example.com", "/").await;
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(location(&response), "https://example.com/");
}

#[tokio::test]
async fn test_unparsable_request_host_is_not_redirected() {
    let dir = tempfile::tempdir().unwrap();
    write_record(dir.path(), "example.com");

    let response = get(router_for(&dir), "example.com:http", "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(LOCATION).is_none());
}
