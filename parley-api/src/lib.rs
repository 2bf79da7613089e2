//! HTTP and WebSocket transport for the Parley relay
//!
//! Thin plumbing over [`parley_core::DeliveryRouter`]: JSON endpoints for
//! presence, sending and history, and a WebSocket adapter that serves as
//! the live channel for an endpoint.

pub mod api;
pub mod error;
pub mod handlers;
pub mod server;
pub mod state;
pub mod types;
pub mod ws;

pub use api::build_router;
pub use server::ApiServer;
pub use state::AppState;
