//! Core data types for the relay engine

use super::stamp::{self, Digest};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Unix timestamp in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Create a timestamp representing the current time
    pub fn now() -> Self {
        let duration = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
        Timestamp(duration.as_millis() as u64)
    }

    /// Create a timestamp from milliseconds since epoch
    pub fn from_millis(millis: u64) -> Self {
        Timestamp(millis)
    }

    /// Get milliseconds since epoch
    pub fn as_millis(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque name of a participant.
///
/// The same identifier keys the presence registry, message queries and
/// the live channel registry. Nothing is enforced beyond non-emptiness at
/// the send boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EndpointId(pub String);

impl EndpointId {
    pub fn new(id: impl Into<String>) -> Self {
        EndpointId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EndpointId {
    fn from(id: &str) -> Self {
        EndpointId(id.to_string())
    }
}

impl From<String> for EndpointId {
    fn from(id: String) -> Self {
        EndpointId(id)
    }
}

/// Reachability state of one endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceRecord {
    pub endpoint: EndpointId,
    pub reachable: bool,
    pub last_seen: Timestamp,
}

/// A stored point-to-point message
///
/// Records are immutable once appended; the store hands out clones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Sending endpoint
    pub sender: EndpointId,

    /// Receiving endpoint
    pub receiver: EndpointId,

    /// Message body as submitted
    pub body: String,

    /// Digest of `body`, computed when the message was accepted
    pub digest: Digest,

    /// When the relay accepted the message
    pub sent_at: Timestamp,
}

impl Message {
    /// Build a stamped message timestamped now
    pub fn new(sender: EndpointId, receiver: EndpointId, body: String) -> Self {
        let digest = stamp::stamp(&body);
        Self {
            sender,
            receiver,
            body,
            digest,
            sent_at: Timestamp::now(),
        }
    }

    /// Whether `endpoint` is the sender or the receiver
    pub fn involves(&self, endpoint: &EndpointId) -> bool {
        &self.sender == endpoint || &self.receiver == endpoint
    }

    /// Re-check the stored digest against the body
    pub fn verify_integrity(&self) -> bool {
        stamp::verify(&self.body, &self.digest)
    }
}

/// Real-time event pushed to a receiver's live channel.
///
/// Digest and timestamps stay store-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveEvent {
    pub sender: EndpointId,
    pub body: String,
}

impl From<&Message> for LiveEvent {
    fn from(message: &Message) -> Self {
        Self {
            sender: message.sender.clone(),
            body: message.body.clone(),
        }
    }
}
