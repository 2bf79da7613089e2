//! Error types for the relay engine

use super::types::EndpointId;
use thiserror::Error;

/// Rejections from [`DeliveryRouter::send`](super::DeliveryRouter::send)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    /// A required input was empty. Carries the first missing field name.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The receiver is not currently reachable
    #[error("Receiver is not connected: {0}")]
    ReceiverUnavailable(EndpointId),
}

/// Presence registry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PresenceError {
    /// The endpoint never registered
    #[error("Endpoint not found: {0}")]
    NotFound(EndpointId),
}

/// Failures reported by a live channel adapter.
///
/// The router only logs these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PushError {
    #[error("Live channel closed for {0}")]
    ChannelClosed(EndpointId),

    #[error("Live channel buffer full for {0}")]
    BufferFull(EndpointId),

    #[error("Transport error: {0}")]
    Transport(String),
}
