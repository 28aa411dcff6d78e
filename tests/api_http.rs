// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - POST /refresh, GET /state (snapshot shape, rewrite shown)
// - POST /select, /window, /perspective (happy path + 400s)
// - GET /cards/{index}/headline

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use common::{item, StaticProvider};
use purple_digest::rewrite::MockRewriter;
use purple_digest::{create_router, ContentCache, Orchestrator, TimeWindow};
use serde_json::{json, Value};
use tower::ServiceExt as _; // for `oneshot`

const BODY_LIMIT: usize = 1024 * 1024;

fn test_router() -> Router {
    let orchestrator = Orchestrator::new(
        vec![Box::new(StaticProvider(vec![
            item("a", "Original A", Some("Senate passes the budget resolution tonight")),
            item("b", "Original B", None),
        ]))],
        Arc::new(MockRewriter),
        Arc::new(ContentCache::default()),
        TimeWindow::ThisMonth,
    );
    create_router(Arc::new(orchestrator))
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let req = match body {
        Some(v) => req.body(Body::from(serde_json::to_vec(&v).unwrap())),
        None => req.body(Body::empty()),
    }
    .expect("build request");

    let resp = app.clone().oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.expect("read body");
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::String(
        String::from_utf8_lossy(&bytes).into_owned(),
    ));
    (status, json)
}

/// Poll `/state` until the background rewrite has landed, as a client would.
async fn wait_ready(app: &Router) -> Value {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let (_, s) = call(app, "GET", "/state", None).await;
            if s["display"]["status"] == "ready" {
                return s;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("rewrite did not finish in time")
}

#[tokio::test]
async fn health_returns_ok() {
    let app = test_router();
    let (status, body) = call(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("ok"));
}

#[tokio::test]
async fn state_before_refresh_is_empty() {
    let app = test_router();
    let (status, s) = call(&app, "GET", "/state", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(s["window"], "This Month");
    assert_eq!(s["items"], json!([]));
    assert_eq!(s["selected"], Value::Null);
    assert_eq!(s["display"]["status"], "idle");
    assert_eq!(s["rewriter"], "mock");
}

#[tokio::test]
async fn refresh_then_state_shows_rewrite() {
    let app = test_router();
    let (status, s) = call(&app, "POST", "/refresh", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(s["items"].as_array().unwrap().len(), 2);
    assert_eq!(s["selected"], 0);

    let s = wait_ready(&app).await;
    assert_eq!(s["display"]["key"], "This Month|a");
    assert_eq!(s["headline"], "Senate passes the budget resolution tonight");
    assert_eq!(s["perspective"], "neutral");
    assert_eq!(s["visible_text"], "Senate passes the budget resolution tonight");
    assert_eq!(
        s["display"]["result"]["left_leaning_view"],
        "Supporters welcome the move."
    );
}

#[tokio::test]
async fn select_out_of_range_is_400() {
    let app = test_router();
    call(&app, "POST", "/refresh", None).await;
    let (status, _) = call(&app, "POST", "/select", Some(json!({"index": 5}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, s) = call(&app, "POST", "/select", Some(json!({"index": 1}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(s["selected"], 1);
}

#[tokio::test]
async fn window_and_perspective_updates() {
    let app = test_router();
    call(&app, "POST", "/refresh", None).await;

    let (status, _) = call(&app, "POST", "/window", Some(json!({"window": "fortnight"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, s) = call(&app, "POST", "/window", Some(json!({"window": "week"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(s["window"], "This Week");

    wait_ready(&app).await;
    let (status, s) = call(
        &app,
        "POST",
        "/perspective",
        Some(json!({"perspective": "right"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(s["perspective"], "right");
    assert_eq!(s["display"]["key"], "This Week|a");
    assert_eq!(s["visible_text"], "Critics raise concerns.");
}

#[tokio::test]
async fn card_headline_endpoint() {
    let app = test_router();
    call(&app, "POST", "/refresh", None).await;

    let (status, body) = call(&app, "GET", "/cards/1/headline", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["index"], 1);
    // Item b has no body; the mock rewrites its title.
    assert_eq!(body["headline"], "Original B");

    let (status, _) = call(&app, "GET", "/cards/9/headline", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
