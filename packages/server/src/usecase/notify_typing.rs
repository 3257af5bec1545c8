//! UseCase: タイピング通知
//!
//! サーバーはタイピング状態を保持しない。開始・停止のイベントを送信者以外の全接続へ中継するだけで、
//! 表示の自動消去（タイムアウト）は受信側の責務。

use std::sync::Arc;

use crate::domain::{ConnectionId, ConnectionRepository, DisplayName, MessagePusher, OutboundEvent};

use super::error::TypingError;

/// タイピング通知のユースケース
pub struct NotifyTypingUseCase {
    repository: Arc<dyn ConnectionRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl NotifyTypingUseCase {
    pub fn new(
        repository: Arc<dyn ConnectionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// タイピング開始を送信者以外へ中継し、配送件数を返す
    pub async fn notify_typing(&self, sender: &ConnectionId) -> Result<usize, TypingError> {
        let sender_name = self.resolve_sender(sender).await?;
        Ok(self
            .relay(sender, OutboundEvent::TypingStarted {
                sender: sender_name,
            })
            .await)
    }

    /// タイピング停止を送信者以外へ中継し、配送件数を返す
    pub async fn notify_stop_typing(&self, sender: &ConnectionId) -> Result<usize, TypingError> {
        let sender_name = self.resolve_sender(sender).await?;
        Ok(self
            .relay(sender, OutboundEvent::TypingStopped {
                sender: sender_name,
            })
            .await)
    }

    async fn resolve_sender(&self, sender: &ConnectionId) -> Result<DisplayName, TypingError> {
        self.repository
            .get(sender)
            .await
            .and_then(|c| c.display_name)
            .ok_or_else(|| TypingError::NotJoined(sender.to_string()))
    }

    async fn relay(&self, sender: &ConnectionId, event: OutboundEvent) -> usize {
        let targets: Vec<ConnectionId> = self
            .repository
            .all_connection_ids()
            .await
            .into_iter()
            .filter(|id| id != sender)
            .collect();

        match self.message_pusher.broadcast(targets, &event).await {
            Ok(delivered) => delivered,
            Err(e) => {
                tracing::warn!("Failed to relay typing signal: {}", e);
                0
            }
        }
    }
}
