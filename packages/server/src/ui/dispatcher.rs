//! Event dispatch.
//!
//! Maps each inbound event tag to its usecase. Every event, including connect
//! and disconnect, runs under one server-wide lock, so a registry mutation and
//! the fanout it triggers form a single step and presence snapshots reach
//! clients in mutation order. Deliveries never wait on a client's queue, so
//! holding the lock across a fanout cannot stall on a slow consumer.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    domain::{
        Acknowledgment, ConnectionId, DeliveryFailure, DisplayName, DomainError, PusherChannel,
        RoomId,
    },
    infrastructure::dto::{conversion::PayloadParts, websocket::ClientMessage},
    usecase::{
        AcknowledgeSendUseCase, ConnectParticipantUseCase, DisconnectParticipantUseCase,
        JoinParticipantUseCase, ManageRoomUseCase, NotifyTypingUseCase, SendMessageUseCase,
    },
};

/// Usecases the dispatcher routes events to
pub struct DispatcherUseCases {
    pub connect_participant: Arc<ConnectParticipantUseCase>,
    pub join_participant: Arc<JoinParticipantUseCase>,
    pub disconnect_participant: Arc<DisconnectParticipantUseCase>,
    pub send_message: Arc<SendMessageUseCase>,
    pub acknowledge_send: Arc<AcknowledgeSendUseCase>,
    pub notify_typing: Arc<NotifyTypingUseCase>,
    pub manage_room: Arc<ManageRoomUseCase>,
}

pub struct EventDispatcher {
    usecases: DispatcherUseCases,
    max_attachment_bytes: usize,
    /// Serializes every event across all connections
    serial: Mutex<()>,
}

impl EventDispatcher {
    pub fn new(usecases: DispatcherUseCases, max_attachment_bytes: usize) -> Self {
        Self {
            usecases,
            max_attachment_bytes,
            serial: Mutex::new(()),
        }
    }

    /// Register a newly established channel and return its identity
    pub async fn connect(&self, sender: PusherChannel) -> ConnectionId {
        let _serial = self.serial.lock().await;
        let connection_id = self.usecases.connect_participant.execute(sender).await;
        tracing::info!("Connection '{}' established", connection_id);
        connection_id
    }

    /// Purge all state of a lost channel and republish presence if it had joined
    pub async fn disconnect(&self, connection_id: &ConnectionId) {
        let _serial = self.serial.lock().await;
        match self
            .usecases
            .disconnect_participant
            .execute(connection_id)
            .await
        {
            Some(connection) => tracing::info!(
                "Connection '{}' ({}) disconnected and removed from registry",
                connection_id,
                connection
                    .display_name
                    .as_ref()
                    .map_or("not joined", DisplayName::as_str)
            ),
            None => tracing::debug!("Connection '{}' was already removed", connection_id),
        }
    }

    /// Parse a text frame and dispatch it. Unparseable frames are dropped.
    pub async fn dispatch_text(&self, connection_id: &ConnectionId, text: &str) {
        match serde_json::from_str::<ClientMessage>(text) {
            Ok(message) => self.dispatch(connection_id, message).await,
            Err(e) => tracing::warn!(
                "Dropped malformed event from connection '{}': {}",
                connection_id,
                e
            ),
        }
    }

    pub async fn dispatch(&self, connection_id: &ConnectionId, message: ClientMessage) {
        let _serial = self.serial.lock().await;

        match message {
            ClientMessage::Join { display_name } => {
                self.handle_join(connection_id, display_name).await
            }
            ClientMessage::SendBroadcast {
                text,
                file_name,
                file_type,
                file_content,
                client_timestamp,
                ack_id,
            } => {
                let parts = PayloadParts {
                    text,
                    file_name,
                    file_type,
                    file_content,
                };
                let ack = match parts.into_payload(self.max_attachment_bytes) {
                    Ok(payload) => {
                        self.usecases
                            .send_message
                            .route_broadcast(connection_id, payload, client_timestamp)
                            .await
                    }
                    Err(e) => malformed(connection_id, "send_broadcast", &e),
                };
                self.acknowledge(connection_id, ack_id, ack).await;
            }
            ClientMessage::SendDirect {
                target_display_name,
                text,
                file_name,
                file_type,
                file_content,
                client_timestamp,
                ack_id,
            } => {
                let parts = PayloadParts {
                    text,
                    file_name,
                    file_type,
                    file_content,
                };
                let routed = DisplayName::new(target_display_name).and_then(|target| {
                    Ok((target, parts.into_payload(self.max_attachment_bytes)?))
                });
                let ack = match routed {
                    Ok((target, payload)) => {
                        self.usecases
                            .send_message
                            .route_direct(connection_id, target, payload, client_timestamp)
                            .await
                    }
                    Err(e) => malformed(connection_id, "send_direct", &e),
                };
                self.acknowledge(connection_id, ack_id, ack).await;
            }
            ClientMessage::SendRoom {
                room_id,
                message,
                file_name,
                file_type,
                file_content,
                client_timestamp,
                ack_id,
            } => {
                let parts = PayloadParts {
                    text: message,
                    file_name,
                    file_type,
                    file_content,
                };
                let routed = RoomId::new(room_id).and_then(|room_id| {
                    Ok((room_id, parts.into_payload(self.max_attachment_bytes)?))
                });
                let ack = match routed {
                    Ok((room_id, payload)) => {
                        self.usecases
                            .send_message
                            .route_to_room(connection_id, room_id, payload, client_timestamp)
                            .await
                    }
                    Err(e) => malformed(connection_id, "send_room", &e),
                };
                self.acknowledge(connection_id, ack_id, ack).await;
            }
            ClientMessage::JoinRoom { room_id } => {
                self.handle_room(connection_id, room_id, true).await
            }
            ClientMessage::LeaveRoom { room_id } => {
                self.handle_room(connection_id, room_id, false).await
            }
            ClientMessage::TypingStart {} => {
                if let Err(e) = self.usecases.notify_typing.notify_typing(connection_id).await {
                    tracing::warn!("Dropped typing_start: {}", e);
                }
            }
            ClientMessage::TypingStop {} => {
                if let Err(e) = self
                    .usecases
                    .notify_typing
                    .notify_stop_typing(connection_id)
                    .await
                {
                    tracing::warn!("Dropped typing_stop: {}", e);
                }
            }
        }
    }

    async fn handle_join(&self, connection_id: &ConnectionId, display_name: String) {
        let display_name = match DisplayName::new(display_name) {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!(
                    "Dropped join from connection '{}': {}",
                    connection_id,
                    e
                );
                return;
            }
        };

        match self
            .usecases
            .join_participant
            .execute(connection_id, display_name)
            .await
        {
            Ok(presence) => tracing::info!(
                "Connection '{}' joined ({} online)",
                connection_id,
                presence.len()
            ),
            Err(e) => tracing::warn!("Failed to join: {}", e),
        }
    }

    async fn handle_room(&self, connection_id: &ConnectionId, room_id: String, join: bool) {
        let room_id = match RoomId::new(room_id) {
            Ok(room_id) => room_id,
            Err(e) => {
                tracing::warn!(
                    "Dropped room event from connection '{}': {}",
                    connection_id,
                    e
                );
                return;
            }
        };

        let result = if join {
            self.usecases
                .manage_room
                .join_room(connection_id, room_id.clone())
                .await
        } else {
            self.usecases
                .manage_room
                .leave_room(connection_id, &room_id)
                .await
        };
        match result {
            Ok(changed) => tracing::debug!(
                "Connection '{}' {} room '{}' (changed: {})",
                connection_id,
                if join { "joined" } else { "left" },
                room_id,
                changed
            ),
            Err(e) => tracing::warn!("Failed to update room membership: {}", e),
        }
    }

    async fn acknowledge(
        &self,
        connection_id: &ConnectionId,
        ack_id: Option<u64>,
        ack: Acknowledgment,
    ) {
        self.usecases
            .acknowledge_send
            .execute(connection_id, ack_id, ack)
            .await;
    }
}

fn malformed(connection_id: &ConnectionId, event: &str, error: &DomainError) -> Acknowledgment {
    tracing::warn!(
        "Rejected {} from connection '{}': {}",
        event,
        connection_id,
        error
    );
    Acknowledgment::failed(DeliveryFailure::MalformedEvent)
}
