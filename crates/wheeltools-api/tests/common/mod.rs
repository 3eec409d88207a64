//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;
use wheeltools_core::clock::Clock;
use wheeltools_ipc::client::IpcClient;
use wheeltools_orchestration::domain::delivery::DeliverySettings;
use wheeltools_roster::application::roster_store::RosterStore;
use wheeltools_test_support::{
    FixedClock, InMemoryConfigRepository, ScriptedGameBackend, StaticChannelResolver,
};

use wheeltools_api::build_router;
use wheeltools_api::state::AppState;

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// Everything a test needs to drive and inspect the app.
pub struct TestApp {
    pub state: AppState,
    pub backend: Arc<ScriptedGameBackend>,
}

impl TestApp {
    /// A fresh router over the shared state.
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }
}

/// Build the full app with an in-memory roster and a scripted game backend.
pub fn build_test_app() -> TestApp {
    build_test_app_with_backend(ScriptedGameBackend::default())
}

/// Build the full app with a custom backend, e.g. one that fails for some
/// titles. Links are sent 10 ms apart.
pub fn build_test_app_with_backend(backend: ScriptedGameBackend) -> TestApp {
    let clock = fixed_clock();
    let store = Arc::new(
        RosterStore::open(Arc::new(InMemoryConfigRepository::default()), clock.clone()).unwrap(),
    );
    let backend = Arc::new(backend);
    let ipc = Arc::new(IpcClient::new(Arc::new(StaticChannelResolver::new(
        backend.clone(),
    ))));
    let delivery = DeliverySettings {
        send_delay: Duration::from_millis(10),
        ..DeliverySettings::default()
    };
    TestApp {
        state: AppState::new(clock, store, ipc, delivery),
        backend,
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    // Extractor rejections answer in plain text.
    let json = serde_json::from_slice(&body_bytes).unwrap_or(serde_json::Value::Null);

    (status, json)
}

/// Send a request with a JSON body and return the response.
pub async fn send_json(
    app: Router,
    method: &str,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send_json(app, "POST", uri, body).await
}

/// Send a request without a body and return the response.
pub async fn send_empty(app: Router, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send_empty(app, "GET", uri).await
}

/// Report a party through the host feed.
pub async fn report_party(app: &TestApp, members: serde_json::Value) {
    let (status, _) = send_json(
        app.router(),
        "PUT",
        "/api/v1/party/snapshot",
        &serde_json::json!({ "members": members }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
