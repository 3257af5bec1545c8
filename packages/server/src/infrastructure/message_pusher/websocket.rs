//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - クライアントごとの送信キュー（有界の `mpsc::Sender`）を管理
//! - `OutboundEvent` を JSON にエンコードしてキューへ渡す（push_to, broadcast）
//!
//! ## 設計ノート
//!
//! WebSocket の生成とキューからソケットへの書き出しは UI 層（`ui/handler/websocket.rs`）で行われます。
//! ここでは `try_send` だけを使うため、キューが満杯のクライアントがいても他のクライアントへの配送は止まりません。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc::error::TrySendError};

use crate::{
    domain::{
        ConnectionId, MessagePushError, MessagePusher, OutboundEvent, OutboundFrame, PusherChannel,
    },
    infrastructure::dto::conversion::encode_event,
};

/// WebSocket を使った MessagePusher 実装
#[derive(Default)]
pub struct WebSocketMessagePusher {
    /// 接続中のクライアントの送信キュー
    clients: Mutex<HashMap<ConnectionId, PusherChannel>>,
}

impl WebSocketMessagePusher {
    /// 新しい WebSocketMessagePusher を作成
    pub fn new() -> Self {
        Self::default()
    }
}

fn encode_frame(event: &OutboundEvent) -> Result<OutboundFrame, MessagePushError> {
    encode_event(event)
        .map(OutboundFrame::from)
        .map_err(|e| MessagePushError::Encode(e.to_string()))
}

/// エンコード済みのフレームを 1 つのキューへ渡す
fn try_push(
    connection_id: &ConnectionId,
    sender: &PusherChannel,
    frame: OutboundFrame,
) -> Result<(), MessagePushError> {
    sender.try_send(frame).map_err(|e| match e {
        TrySendError::Full(_) => MessagePushError::OutboundBackpressure(connection_id.to_string()),
        TrySendError::Closed(_) => MessagePushError::TransportLost(connection_id.to_string()),
    })
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        clients.insert(connection_id, sender);
        tracing::debug!("Connection '{}' registered to MessagePusher", connection_id);
    }

    async fn unregister_client(&self, connection_id: &ConnectionId) {
        let mut clients = self.clients.lock().await;
        clients.remove(connection_id);
        tracing::debug!(
            "Connection '{}' unregistered from MessagePusher",
            connection_id
        );
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &OutboundEvent,
    ) -> Result<(), MessagePushError> {
        let frame = encode_frame(event)?;
        let clients = self.clients.lock().await;

        let sender = clients
            .get(connection_id)
            .ok_or_else(|| MessagePushError::ClientNotFound(connection_id.to_string()))?;
        try_push(connection_id, sender, frame)?;
        tracing::debug!("Pushed event to connection '{}'", connection_id);
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        event: &OutboundEvent,
    ) -> Result<usize, MessagePushError> {
        let frame = encode_frame(event)?;
        let clients = self.clients.lock().await;

        let mut delivered = 0;
        for target in targets {
            let Some(sender) = clients.get(&target) else {
                tracing::warn!("Connection '{}' not found during broadcast, skipping", target);
                continue;
            };
            // ブロードキャストでは一部の送信失敗を許容。clone は参照カウントのみ
            match try_push(&target, sender, frame.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => tracing::warn!("Dropped broadcast delivery: {}", e),
            }
        }

        Ok(delivered)
    }
}
