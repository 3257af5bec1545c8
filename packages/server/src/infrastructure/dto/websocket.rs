//! WebSocket event DTOs.
//!
//! Every frame is a JSON text frame tagged by `type` (snake_case) with camelCase fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Client -> Server
// ---------------------------------------------------------------------------

/// Events sent from clients to the server.
///
/// Send events may carry an `ackId`; the server then answers with exactly one
/// `send_result` carrying the same id.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    Join {
        display_name: String,
    },
    SendBroadcast {
        text: Option<String>,
        file_name: Option<String>,
        file_type: Option<String>,
        file_content: Option<String>,
        client_timestamp: Option<Value>,
        ack_id: Option<u64>,
    },
    SendDirect {
        target_display_name: String,
        text: Option<String>,
        file_name: Option<String>,
        file_type: Option<String>,
        file_content: Option<String>,
        client_timestamp: Option<Value>,
        ack_id: Option<u64>,
    },
    SendRoom {
        room_id: String,
        message: Option<String>,
        file_name: Option<String>,
        file_type: Option<String>,
        file_content: Option<String>,
        client_timestamp: Option<Value>,
        ack_id: Option<u64>,
    },
    JoinRoom {
        room_id: String,
    },
    LeaveRoom {
        room_id: String,
    },
    TypingStart {},
    TypingStop {},
}

// ---------------------------------------------------------------------------
// Server -> Client
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    PresenceUpdate,
    MessageBroadcast,
    MessageDirect,
    MessageRoom,
    TypingStarted,
    TypingStopped,
    SendResult,
}

/// Full-state presence list, broadcast to every connection
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PresenceUpdateMessage {
    pub r#type: MessageType,
    pub display_names: Vec<String>,
}

/// Message body on the wire: either `text` or the three file fields.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PayloadDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    /// base64 (standard alphabet, padded)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_content: Option<String>,
}

/// Delivered chat message (`message_broadcast`, `message_direct`, `message_room`)
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub r#type: MessageType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    pub sender: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(flatten)]
    pub payload: PayloadDto,
    /// RFC 3339 (UTC)
    pub server_timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_timestamp: Option<Value>,
    /// Present on direct messages only: `true` on the copy echoed to the sender
    #[serde(rename = "self", skip_serializing_if = "Option::is_none")]
    pub self_originated: Option<bool>,
}

/// `typing_started` / `typing_stopped`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TypingMessage {
    pub r#type: MessageType,
    pub sender: String,
}

/// One-shot acknowledgment returned to the sender only
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SendResultMessage {
    pub r#type: MessageType,
    pub ack_id: u64,
    pub delivered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
