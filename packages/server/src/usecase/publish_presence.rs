//! UseCase: プレゼンス配信
//!
//! レジストリから表示名一覧を導出し、全接続へ全量を送る（差分ではない）。
//! join / 切断と同じ直列化ステップの中で同期的に呼ばれる。

use std::sync::Arc;

use crate::domain::{ConnectionRepository, DisplayName, MessagePusher, OutboundEvent};

/// プレゼンス配信のユースケース
pub struct PublishPresenceUseCase {
    repository: Arc<dyn ConnectionRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl PublishPresenceUseCase {
    pub fn new(
        repository: Arc<dyn ConnectionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 現在の表示名一覧を全接続へ配信し、配信した一覧を返す
    ///
    /// レジストリが空なら空の一覧を配信する。
    pub async fn execute(&self) -> Vec<DisplayName> {
        let display_names = self.repository.list_display_names().await;
        let targets = self.repository.all_connection_ids().await;
        let event = OutboundEvent::PresenceUpdate {
            display_names: display_names.clone(),
        };

        match self.message_pusher.broadcast(targets, &event).await {
            Ok(delivered) => tracing::info!(
                "Published presence ({} online) to {} connection(s)",
                display_names.len(),
                delivered
            ),
            Err(e) => tracing::warn!("Failed to publish presence: {}", e),
        }

        display_names
    }
}
