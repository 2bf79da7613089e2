//! HTTP surface tests, driving the router in-process

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use parley_api::{build_router, AppState};
use parley_core::config::Config;
use parley_core::test_utils::{recv_timeout, RecordingHandle, DEFAULT_TEST_TIMEOUT};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::from_config(&Config::default()));
    (build_router(state.clone(), true), state)
}

async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    call(app, req).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    call(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

#[tokio::test]
async fn home_page_lists_endpoints() {
    let (app, _) = app();
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let page = String::from_utf8_lossy(&bytes);
    assert!(page.contains("Welcome to Parley"));
    for route in ["/connect", "/disconnect", "/send_message", "/get_messages/:user_id", "/ws/:user_id"] {
        assert!(page.contains(route), "home page lists {route}");
    }
}

#[tokio::test]
async fn connect_requires_user_id() {
    let (app, _) = app();

    let (status, body) = post(&app, "/connect", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields");

    let (status, _) = post(&app, "/connect", json!({"user_id": ""})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn connect_and_disconnect() {
    let (app, _) = app();

    let (status, body) = post(&app, "/connect", json!({"user_id": "alice"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User alice connected");

    let (status, body) = post(&app, "/disconnect", json!({"user_id": "alice"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User alice disconnected");
}

#[tokio::test]
async fn disconnect_unknown_user_is_404() {
    let (app, _) = app();

    let (status, body) = post(&app, "/disconnect", json!({"user_id": "ghost"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
    assert_eq!(body["details"], "Endpoint not found: ghost");
}

#[tokio::test]
async fn send_to_connected_receiver() {
    let (app, _) = app();
    post(&app, "/connect", json!({"user_id": "alice"})).await;
    post(&app, "/connect", json!({"user_id": "bob"})).await;

    let (status, body) = post(
        &app,
        "/send_message",
        json!({"sender_id": "alice", "receiver_id": "bob", "message": "hello"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Message sent successfully");
    assert_eq!(body["data"]["sender"], "alice");
    assert_eq!(body["data"]["receiver"], "bob");
    assert_eq!(body["data"]["body"], "hello");
    assert_eq!(body["data"]["digest"].as_str().unwrap().len(), 64);
}

#[tokio::test]
async fn send_to_offline_receiver_is_rejected_and_not_stored() {
    let (app, _) = app();
    post(&app, "/connect", json!({"user_id": "alice"})).await;

    let (status, body) = post(
        &app,
        "/send_message",
        json!({"sender_id": "alice", "receiver_id": "bob", "message": "hello"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Receiver is not connected");

    let (_, history) = get(&app, "/get_messages/alice").await;
    assert_eq!(history, json!([]));
}

#[tokio::test]
async fn send_with_missing_fields_is_400() {
    let (app, _) = app();
    post(&app, "/connect", json!({"user_id": "bob"})).await;

    let (status, _) =
        post(&app, "/send_message", json!({"sender_id": "alice", "receiver_id": "bob"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) =
        post(&app, "/send_message", json!({"receiver_id": "bob", "message": "hi"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn history_is_chronological_per_participant() {
    let (app, _) = app();
    for user in ["alice", "bob", "carol"] {
        post(&app, "/connect", json!({"user_id": user})).await;
    }

    for (from, to, text) in [("alice", "bob", "m1"), ("carol", "bob", "m2"), ("bob", "alice", "m3")] {
        let (status, _) = post(
            &app,
            "/send_message",
            json!({"sender_id": from, "receiver_id": to, "message": text}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, history) = get(&app, "/get_messages/alice").await;
    assert_eq!(status, StatusCode::OK);
    let bodies: Vec<_> = history.as_array().unwrap().iter().map(|m| m["body"].clone()).collect();
    assert_eq!(bodies, vec![json!("m1"), json!("m3")]);

    let (_, history) = get(&app, "/get_messages/bob").await;
    assert_eq!(history.as_array().unwrap().len(), 3);

    let (_, history) = get(&app, "/get_messages/nobody").await;
    assert_eq!(history, json!([]));
}

#[tokio::test]
async fn presence_lookup() {
    let (app, _) = app();

    let (status, _) = get(&app, "/presence/alice").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    post(&app, "/connect", json!({"user_id": "alice"})).await;
    let (status, record) = get(&app, "/presence/alice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["reachable"], true);

    post(&app, "/disconnect", json!({"user_id": "alice"})).await;
    let (_, record) = get(&app, "/presence/alice").await;
    assert_eq!(record["reachable"], false);
}

#[tokio::test]
async fn send_pushes_to_bound_live_channel() {
    let (app, state) = app();
    post(&app, "/connect", json!({"user_id": "alice"})).await;
    post(&app, "/connect", json!({"user_id": "bob"})).await;

    let (handle, mut rx) = RecordingHandle::new("bob");
    state.router.bind("bob", handle).await;

    let (status, _) = post(
        &app,
        "/send_message",
        json!({"sender_id": "alice", "receiver_id": "bob", "message": "live"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let event = recv_timeout(&mut rx, DEFAULT_TEST_TIMEOUT).await.unwrap();
    assert_eq!(event.sender.as_str(), "alice");
    assert_eq!(event.body, "live");
}

#[tokio::test]
async fn health_reports_relay_and_drains_on_shutdown() {
    let (app, state) = app();

    let (status, report) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["status"], "Healthy");

    state.shutdown.shutdown().await;
    let (status, report) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(report["status"], "Unhealthy");
}
