use super::*;
use crate::Config;
use crate::relay::test_helpers::{FakeDownloader, FakeOutput, FakeStore, test_config};
use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::Response;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;


/// Everything a router test needs to inspect afterwards
struct TestApp {
    router: Router,
    downloader: Arc<FakeDownloader>,
    store: Arc<FakeStore>,
    temp_root: TempDir,
}

fn build_app(output: FakeOutput, store: FakeStore, tweak: impl FnOnce(&mut Config)) -> TestApp {
    let temp_root = tempfile::tempdir().unwrap();
    let mut config = test_config(temp_root.path());
    tweak(&mut config);

    let downloader = Arc::new(FakeDownloader::new(output));
    let store = Arc::new(store);
    let relay = Arc::new(Relay::new(&config, downloader.clone(), store.clone()));

    TestApp {
        router: create_router(relay, Arc::new(config)),
        downloader,
        store,
        temp_root,
    }
}

fn test_app(output: FakeOutput) -> TestApp {
    build_app(output, FakeStore::default(), |_| {})
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_string(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

fn workspace_residue(app: &TestApp) -> usize {
    std::fs::read_dir(app.temp_root.path()).unwrap().count()
}

#[tokio::test]
async fn server_starts_and_stops_gracefully() {
    let app = test_app(FakeOutput::Single);
    let mut config = test_config(app.temp_root.path());
    config.server.api.bind_address = "127.0.0.1:0".parse().unwrap();

    let relay = Arc::new(Relay::new(
        &config,
        app.downloader.clone(),
        app.store.clone(),
    ));
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let handle = tokio::spawn(start_api_server(relay, Arc::new(config), async move {
        rx.await.ok();
    }));

    tokio::time::sleep(Duration::from_millis(100)).await;
    tx.send(()).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn cors_headers_for_any_origin() {
    let app = test_app(FakeOutput::Single);

    let request = Request::builder()
        .uri("/api/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
}

#[tokio::test]
async fn cors_restricted_to_configured_origins() {
    let app = build_app(FakeOutput::Single, FakeStore::default(), |c| {
        c.server.api.cors_origins = vec!["https://app.example".into()];
    });

    let allowed = Request::builder()
        .uri("/api/health")
        .header("Origin", "https://app.example")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(allowed).await.unwrap();
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "https://app.example"
    );

    let other = Request::builder()
        .uri("/api/health")
        .header("Origin", "https://evil.example")
        .body(Body::empty())
        .unwrap();
    let response = app.router.oneshot(other).await.unwrap();
    assert!(response.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn cors_disabled_sends_no_headers() {
    let app = build_app(FakeOutput::Single, FakeStore::default(), |c| {
        c.server.api.cors_enabled = false;
    });

    let request = Request::builder()
        .uri("/api/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.router.oneshot(request).await.unwrap();
    assert!(response.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn api_key_protects_download_but_not_health() {
    let app = build_app(FakeOutput::Single, FakeStore::default(), |c| {
        c.server.api.api_key = Some("s3cret".into());
    });

    let response = app.router.clone().oneshot(get_request("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .router
        .clone()
        .oneshot(get_request("/api/download?url=https://youtu.be/abc&format=mp4"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "unauthorized");
    assert_eq!(
        app.downloader
            .calls
            .load(std::sync::atomic::Ordering::SeqCst),
        0
    );

    let request = Request::builder()
        .uri("/api/download?url=https://youtu.be/abc&format=mp4")
        .header("X-Api-Key", "s3cret")
        .body(Body::empty())
        .unwrap();
    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
