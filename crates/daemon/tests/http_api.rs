//! End-to-end tests for the file custody HTTP API
//!
//! These drive the full router in-process against an in-memory database and
//! a throwaway storage directory.

use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::Router;
use http::header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_TYPE};
use http::{Request, StatusCode};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use common::crypto::SigningSecret;
use custody_daemon::http_server::{self, api::v0::files::UploadResponse};
use custody_daemon::{ServiceConfig, ServiceState};

const BOUNDARY: &str = "custody-test-boundary";
const FILES: &str = "/api/v0/files";

struct TestApp {
    router: Router,
    state: ServiceState,
    _temp_dir: TempDir,
}

async fn setup(allowed_content_types: Vec<String>, max_upload_bytes: usize) -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let config = ServiceConfig {
        api_port: 0,
        cors_origins: Vec::new(),
        sqlite_path: None,
        storage_dir: temp_dir.path().join("uploads"),
        signing_secret: SigningSecret::from_bytes(b"http-api-test-secret".to_vec()).unwrap(),
        token_ttl: Duration::from_secs(900),
        max_upload_bytes,
        allowed_content_types,
        log_level: tracing::Level::INFO,
        log_dir: None,
    };

    let state = ServiceState::from_config(&config).await.unwrap();
    let http_config = http_server::Config::new("127.0.0.1:0".parse().unwrap(), &config);
    let router = http_server::router(&http_config, state.clone());

    TestApp {
        router,
        state,
        _temp_dir: temp_dir,
    }
}

async fn default_app() -> TestApp {
    setup(Vec::new(), 1024 * 1024).await
}

fn multipart_body(file_name: &str, content_type: &str, content: &[u8], owner: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(owner) = owner {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"owner_id\"\r\n\r\n{owner}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::post(FILES)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn authed(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn upload(app: &TestApp, name: &str, content: &[u8], owner: Option<&str>) -> UploadResponse {
    let response = app
        .router
        .clone()
        .oneshot(upload_request(multipart_body(name, "text/plain", content, owner)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_upload_download_metadata_delete_flow() {
    let app = default_app().await;
    let uploaded = upload(&app, "hello.txt", b"hello world", Some("alice")).await;

    assert_eq!(uploaded.status, "success");
    assert_eq!(uploaded.expires_in, 900);
    assert_eq!(uploaded.content_type, "text/plain");
    assert_eq!(uploaded.size_bytes, 11);

    let file_uri = format!("{FILES}/{}", uploaded.file_id);

    // Download returns the plaintext with safe headers
    let response = app
        .router
        .clone()
        .oneshot(authed("GET", &file_uri, &uploaded.token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
    assert_eq!(response.headers()[CACHE_CONTROL], "no-store");
    assert_eq!(
        response.headers()[CONTENT_DISPOSITION],
        "inline; filename=\"hello.txt\""
    );
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"hello world");

    // Metadata
    let response = app
        .router
        .clone()
        .oneshot(authed("GET", &format!("{file_uri}/metadata"), &uploaded.token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["original_name"], "hello.txt");
    assert_eq!(body["owner_id"], "alice");
    assert_eq!(body["size_bytes"], 11);
    assert_eq!(body["encryption_alg"], "AES-256");
    assert_eq!(body["authentication_alg"], "GCM");

    // Delete, then the file is gone
    let response = app
        .router
        .clone()
        .oneshot(authed("DELETE", &file_uri, &uploaded.token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "success");

    let response = app
        .router
        .clone()
        .oneshot(authed("GET", &file_uri, &uploaded.token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "file not found");
}

#[tokio::test]
async fn test_download_without_bearer_is_unauthorized() {
    let app = default_app().await;
    let uploaded = upload(&app, "a.txt", b"a", None).await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::get(format!("{FILES}/{}", uploaded.file_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_token_for_another_file_is_forbidden() {
    let app = default_app().await;
    let first = upload(&app, "first.txt", b"first", None).await;
    let second = upload(&app, "second.txt", b"second", None).await;

    let response = app
        .router
        .clone()
        .oneshot(authed(
            "GET",
            &format!("{FILES}/{}", second.file_id),
            &first.token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .router
        .clone()
        .oneshot(authed(
            "GET",
            &format!("{FILES}/{}", first.file_id),
            "not-a-real-token",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_malformed_file_id_is_bad_request() {
    let app = default_app().await;
    let response = app
        .router
        .clone()
        .oneshot(authed("GET", &format!("{FILES}/not-a-uuid"), "token"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_by_owner() {
    let app = default_app().await;
    upload(&app, "one.txt", b"1", Some("alice")).await;
    upload(&app, "two.txt", b"22", Some("alice")).await;
    upload(&app, "other.txt", b"333", Some("bob")).await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::get(format!("{FILES}?owner_id=alice"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["count"], 2);
    let names: Vec<&str> = body["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["original_name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"one.txt"));
    assert!(names.contains(&"two.txt"));

    // Legacy parameter name
    let response = app
        .router
        .clone()
        .oneshot(
            Request::get(format!("{FILES}?user_id=bob"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["count"], 1);
}

#[tokio::test]
async fn test_list_without_owner_is_bad_request() {
    let app = default_app().await;
    let response = app
        .router
        .clone()
        .oneshot(Request::get(FILES).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["message"], "owner_id query parameter required");
}

#[tokio::test]
async fn test_disallowed_content_type_is_rejected() {
    let app = setup(vec!["image/png".to_string()], 1024 * 1024).await;
    let response = app
        .router
        .clone()
        .oneshot(upload_request(multipart_body(
            "notes.txt",
            "text/plain",
            b"hello",
            None,
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let app = setup(Vec::new(), 16).await;
    let response = app
        .router
        .clone()
        .oneshot(upload_request(multipart_body(
            "big.txt",
            "text/plain",
            &[b'x'; 64],
            None,
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_upload_without_file_field_is_bad_request() {
    let app = default_app().await;
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"owner_id\"\r\n\r\nalice\r\n--{BOUNDARY}--\r\n"
    );
    let response = app
        .router
        .clone()
        .oneshot(upload_request(body.into_bytes()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_status_probes() {
    let app = default_app().await;

    for probe in ["livez", "readyz", "version"] {
        let response = app
            .router
            .clone()
            .oneshot(
                Request::get(format!("/_status/{probe}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "probe {probe}");
    }

    app.state.shutdown_token().cancel();
    let response = app
        .router
        .clone()
        .oneshot(Request::get("/_status/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = default_app().await;
    let response = app
        .router
        .clone()
        .oneshot(
            Request::get("/nope")
                .header(http::header::ACCEPT, "application/json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["message"], "not found");
}
