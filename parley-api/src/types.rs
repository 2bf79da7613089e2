//! Request and response bodies

use parley_core::Message;
use serde::{Deserialize, Serialize};

// ============================================================================
// Presence Types
// ============================================================================

/// Body of `/connect` and `/disconnect`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresenceRequest {
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub message: String,
}

// ============================================================================
// Message Types
// ============================================================================

/// Body of `/send_message`. Absent fields are treated as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub sender_id: Option<String>,
    #[serde(default)]
    pub receiver_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub message: String,
    pub data: Message,
}

// ============================================================================
// Live Channel Frames
// ============================================================================

/// Frames a client may send on its live channel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    SendMessage {
        receiver_id: String,
        message: String,
    },
}

/// Frames the relay sends on a live channel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// A message pushed to this endpoint
    NewMessage { sender: String, body: String },

    /// Acknowledges a `send_message` frame with the stored record
    MessageSent { data: Message },

    /// A client frame could not be handled
    Error { error: String },
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_frame_shape() {
        let frame: ClientFrame = serde_json::from_str(
            r#"{"type":"send_message","receiver_id":"bob","message":"hi"}"#,
        )
        .unwrap();
        let ClientFrame::SendMessage { receiver_id, message } = frame;
        assert_eq!(receiver_id, "bob");
        assert_eq!(message, "hi");
    }

    #[test]
    fn test_server_frame_shape() {
        let frame = ServerFrame::NewMessage { sender: "alice".into(), body: "ping".into() };
        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(value, serde_json::json!({"type": "new_message", "sender": "alice", "body": "ping"}));
    }

    #[test]
    fn test_send_request_tolerates_missing_fields() {
        let req: SendMessageRequest = serde_json::from_str(r#"{"sender_id":"alice"}"#).unwrap();
        assert_eq!(req.sender_id.as_deref(), Some("alice"));
        assert!(req.receiver_id.is_none());
        assert!(req.message.is_none());
    }
}
