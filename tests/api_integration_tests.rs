//! Integration Tests for Inspector Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use startup_cache::{
    api::create_router,
    cache::{CacheStore, ManualClock, MemoryStorage, Persistence},
    AppState,
};
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> (Router, AppState, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(0));
    let cache = CacheStore::with_clock(
        Arc::new(MemoryStorage::new()),
        Persistence::default(),
        clock.clone(),
    );
    let state = AppState::new(cache);
    (create_router(state.clone()), state, clock)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

// == Entry Endpoint Tests ==

#[tokio::test]
async fn test_entry_lookup_derives_sorted_key() {
    let (app, state, _) = create_test_app();
    state.cache.set("offers::page:2|q:ab", json!({"list": [1, 2], "total": 2}));

    let response = app
        .oneshot(get("/entries/offers?q=ab&page=2"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["key"], "offers::page:2|q:ab");
    assert_eq!(json["value"]["total"], 2);
}

#[tokio::test]
async fn test_entry_uses_catalog_ttl() {
    let (app, state, clock) = create_test_app();
    state.cache.set("notifications", json!([]));

    // notifications are read with a 30 second TTL
    clock.set(30_001);
    let response = app.oneshot(get("/entries/notifications")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(state.cache.is_empty());
}

#[tokio::test]
async fn test_entry_ttl_override() {
    let (app, state, clock) = create_test_app();
    state.cache.set("notifications", json!([]));

    clock.set(30_001);
    let response = app
        .oneshot(get("/entries/notifications?ttl=60000"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_entry_invalid_ttl() {
    let (app, _, _) = create_test_app();

    let response = app
        .oneshot(get("/entries/offers?ttl=later"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("ttl"));
}

#[tokio::test]
async fn test_entry_not_found_body() {
    let (app, _, _) = create_test_app();

    let response = app.oneshot(get("/entries/groups?page=1")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("groups::page:1"));
}

// == Invalidate / Clear Endpoint Tests ==

#[tokio::test]
async fn test_invalidate_endpoint() {
    let (app, state, _) = create_test_app();
    state.cache.set("ns::a", json!("x"));
    state.cache.set("ns::b", json!("y"));
    state.cache.set("other::c", json!("z"));

    let response = app.oneshot(delete("/entries/ns")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["removed"], 2);
    assert_eq!(state.cache.keys(), vec!["other::c".to_string()]);
}

#[tokio::test]
async fn test_clear_endpoint() {
    let (app, state, _) = create_test_app();
    state.cache.set("groups", json!(1));
    state.cache.set("offers", json!(2));

    let response = app.oneshot(delete("/entries")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(state.cache.is_empty());
}

// == Stats / Health Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint_tracks_activity() {
    let (app, state, _) = create_test_app();
    state.cache.set("groups", json!(1));
    state.cache.get("groups", 1_000);
    state.cache.get("missing", 1_000);

    let response = app.oneshot(get("/stats")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 1);
    assert_eq!(json["total_entries"], 1);
    assert_eq!(json["keys"], json!(["groups"]));
    assert_eq!(json["hit_rate"], 0.5);
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _, _) = create_test_app();

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_unknown_route() {
    let (app, _, _) = create_test_app();

    let response = app.oneshot(get("/set")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// == Live Server Test ==

#[tokio::test]
async fn test_live_server_roundtrip() {
    let (app, state, _) = create_test_app();
    state.cache.set("groups::page:1", json!(["g1"]));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = reqwest::Client::new();
    let entry: Value = client
        .get(format!("http://{}/entries/groups?page=1", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(entry["value"], json!(["g1"]));

    let status = client
        .delete(format!("http://{}/entries/groups", addr))
        .send()
        .await
        .unwrap()
        .status();
    assert_eq!(status, reqwest::StatusCode::OK);
    assert!(state.cache.is_empty());

    server.abort();
}
