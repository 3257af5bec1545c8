//! Conversion logic between DTOs and domain entities.

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::domain::{
    Acknowledgment, Attachment, DeliveryScope, DomainError, Message, MessageText, OutboundEvent,
    Payload,
};
use crate::infrastructure::dto::websocket as dto;
use hiroba_shared::time::timestamp_to_rfc3339;

/// MIME type used when a file is sent without `fileType`
const DEFAULT_FILE_TYPE: &str = "application/octet-stream";

// ========================================
// DTO → Domain Entity
// ========================================

/// Raw payload fields as they arrive on a send event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayloadParts {
    pub text: Option<String>,
    pub file_name: Option<String>,
    pub file_type: Option<String>,
    pub file_content: Option<String>,
}

impl PayloadParts {
    /// Build the domain payload. Any file field switches the payload to a file,
    /// which then needs both `fileName` and `fileContent` and must not carry `text`.
    pub fn into_payload(self, max_attachment_bytes: usize) -> Result<Payload, DomainError> {
        let has_file =
            self.file_name.is_some() || self.file_type.is_some() || self.file_content.is_some();
        if !has_file {
            let text = self.text.ok_or(DomainError::MissingPayload)?;
            return Ok(Payload::Text(MessageText::new(text)?));
        }
        if self.text.is_some() {
            return Err(DomainError::AmbiguousPayload);
        }

        let (Some(name), Some(content)) = (self.file_name, self.file_content) else {
            return Err(DomainError::MissingPayload);
        };
        let bytes = decode_file_content(&content)?;
        let mime_type = self
            .file_type
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FILE_TYPE.to_string());

        Ok(Payload::File(Attachment::new(
            name,
            mime_type,
            bytes,
            max_attachment_bytes,
        )?))
    }
}

/// Decode base64 file content. A `data:<mime>;base64,` prefix is accepted.
fn decode_file_content(content: &str) -> Result<Vec<u8>, DomainError> {
    let encoded = match content.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map(|(_, data)| data).unwrap_or(rest),
        None => content,
    };
    STANDARD
        .decode(encoded.trim())
        .map_err(|e| DomainError::InvalidAttachmentEncoding(e.to_string()))
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&Payload> for dto::PayloadDto {
    fn from(payload: &Payload) -> Self {
        match payload {
            Payload::Text(text) => Self {
                text: Some(text.as_str().to_string()),
                ..Default::default()
            },
            Payload::File(file) => Self {
                text: None,
                file_name: Some(file.name.clone()),
                file_type: Some(file.mime_type.clone()),
                file_content: Some(STANDARD.encode(&file.content)),
            },
        }
    }
}

/// Build the wire form of a delivered message.
pub fn chat_message(message: &Message, self_originated: bool) -> dto::ChatMessage {
    let (r#type, room_id, target, self_flag) = match &message.scope {
        DeliveryScope::Broadcast => (dto::MessageType::MessageBroadcast, None, None, None),
        DeliveryScope::Room(room_id) => (
            dto::MessageType::MessageRoom,
            Some(room_id.as_str().to_string()),
            None,
            None,
        ),
        DeliveryScope::Direct(target) => (
            dto::MessageType::MessageDirect,
            None,
            Some(target.as_str().to_string()),
            Some(self_originated),
        ),
    };

    dto::ChatMessage {
        r#type,
        room_id,
        sender: message.sender.as_str().to_string(),
        target,
        payload: (&message.payload).into(),
        server_timestamp: timestamp_to_rfc3339(message.server_timestamp.value()),
        client_timestamp: message.client_timestamp.clone(),
        self_originated: self_flag,
    }
}

fn send_result(ack_id: u64, ack: &Acknowledgment) -> dto::SendResultMessage {
    dto::SendResultMessage {
        r#type: dto::MessageType::SendResult,
        ack_id,
        delivered: ack.delivered,
        reason: ack.reason.map(|r| r.as_str().to_string()),
    }
}

/// Encode an outbound event into a JSON text frame.
pub fn encode_event(event: &OutboundEvent) -> Result<String, serde_json::Error> {
    match event {
        OutboundEvent::PresenceUpdate { display_names } => {
            serde_json::to_string(&dto::PresenceUpdateMessage {
                r#type: dto::MessageType::PresenceUpdate,
                display_names: display_names
                    .iter()
                    .map(|n| n.as_str().to_string())
                    .collect(),
            })
        }
        OutboundEvent::Message {
            message,
            self_originated,
        } => serde_json::to_string(&chat_message(message, *self_originated)),
        OutboundEvent::TypingStarted { sender } => serde_json::to_string(&dto::TypingMessage {
            r#type: dto::MessageType::TypingStarted,
            sender: sender.as_str().to_string(),
        }),
        OutboundEvent::TypingStopped { sender } => serde_json::to_string(&dto::TypingMessage {
            r#type: dto::MessageType::TypingStopped,
            sender: sender.as_str().to_string(),
        }),
        OutboundEvent::SendResult { ack_id, ack } => {
            serde_json::to_string(&send_result(*ack_id, ack))
        }
    }
}
