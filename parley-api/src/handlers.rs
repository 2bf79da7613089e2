//! HTTP handlers

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::types::*;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    Json,
};
use parley_core::health::{checks, HealthCheck};
use parley_core::relay::{EndpointId, Message, PresenceRecord};
use std::sync::Arc;

/// Reject absent or empty identifiers
fn required(value: Option<String>, field: &'static str) -> ApiResult<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::MissingField(field)),
    }
}

/// GET / - Welcome page listing the endpoints
pub async fn home() -> Html<&'static str> {
    Html(concat!(
        "<!DOCTYPE html>\n<html><head><title>Parley</title></head><body>",
        "<h1>Welcome to Parley</h1>",
        "<p>One-to-one real-time messaging relay.</p>",
        "<ul>",
        "<li><code>POST /connect</code> {\"user_id\"}: mark a user reachable</li>",
        "<li><code>POST /disconnect</code> {\"user_id\"}: mark a user unreachable</li>",
        "<li><code>POST /send_message</code> {\"sender_id\", \"receiver_id\", \"message\"}: send a message</li>",
        "<li><code>GET /get_messages/:user_id</code>: conversation history</li>",
        "<li><code>GET /presence/:user_id</code>: presence record</li>",
        "<li><code>GET /ws/:user_id</code>: live channel (WebSocket)</li>",
        "<li><code>GET /health</code>: health report</li>",
        "</ul></body></html>",
    ))
}

/// GET /health - Aggregated process health
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthCheck>) {
    let stats = state.router.stats().await;
    state.health.report(checks::check_relay(&stats)).await;
    state
        .health
        .report(checks::check_lifecycle(state.shutdown.is_shutting_down().await))
        .await;

    let report = state.health.check_health().await;
    let status = StatusCode::from_u16(report.status.to_http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(report))
}

// ============================================================================
// Presence Handlers
// ============================================================================

/// POST /connect - Mark an endpoint reachable
pub async fn connect(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PresenceRequest>,
) -> ApiResult<Json<StatusResponse>> {
    let user_id = required(req.user_id, "user_id")?;
    state.router.register(user_id.as_str()).await;

    Ok(Json(StatusResponse { message: format!("User {} connected", user_id) }))
}

/// POST /disconnect - Mark an endpoint unreachable
pub async fn disconnect(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PresenceRequest>,
) -> ApiResult<Json<StatusResponse>> {
    let user_id = required(req.user_id, "user_id")?;
    state.router.unregister(user_id.as_str()).await?;

    Ok(Json(StatusResponse { message: format!("User {} disconnected", user_id) }))
}

/// GET /presence/:user_id - Presence record of one endpoint
pub async fn get_presence(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<PresenceRecord>> {
    state
        .router
        .presence_record(&EndpointId::from(user_id.as_str()))
        .await
        .map(Json)
        .ok_or(ApiError::NotFound(user_id))
}

// ============================================================================
// Message Handlers
// ============================================================================

/// POST /send_message - Store a message and push it if the receiver is live
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<Json<SendMessageResponse>> {
    let data = state
        .router
        .send(
            req.sender_id.unwrap_or_default(),
            req.receiver_id.unwrap_or_default(),
            req.message.unwrap_or_default(),
        )
        .await?;

    Ok(Json(SendMessageResponse { message: "Message sent successfully".to_string(), data }))
}

/// GET /get_messages/:user_id - Conversation history, oldest first
pub async fn get_messages(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Json<Vec<Message>> {
    Json(state.router.query_by_participant(&EndpointId::from(user_id)).await)
}
