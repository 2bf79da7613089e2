//! API routes definition

use crate::handlers;
use crate::state::AppState;
use crate::ws;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the API router with all endpoints
pub fn build_router(state: Arc<AppState>, enable_cors: bool) -> Router {
    let router = Router::new()
        .route("/", get(handlers::home))
        .route("/health", get(handlers::health))
        // Presence routes
        .route("/connect", post(handlers::connect))
        .route("/disconnect", post(handlers::disconnect))
        .route("/presence/:user_id", get(handlers::get_presence))
        // Message routes
        .route("/send_message", post(handlers::send_message))
        .route("/get_messages/:user_id", get(handlers::get_messages))
        // Live channel
        .route("/ws/:user_id", get(ws::ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
