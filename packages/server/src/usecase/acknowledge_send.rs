//! UseCase: 送信結果（ハンドオフ ack）の返送
//!
//! 送信イベントに `ackId` が付いていた場合に限り、送信者だけへ 1 回だけ結果を返す。
//! サーバー側での再送は行わない。

use std::sync::Arc;

use crate::domain::{Acknowledgment, ConnectionId, MessagePusher, OutboundEvent};

/// ack 返送のユースケース
pub struct AcknowledgeSendUseCase {
    message_pusher: Arc<dyn MessagePusher>,
}

impl AcknowledgeSendUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// 送信結果を送信者へ返す。`ack_id` がなければ何もしない
    ///
    /// # Returns
    ///
    /// ack を送信キューへ渡せたかどうか
    pub async fn execute(
        &self,
        sender: &ConnectionId,
        ack_id: Option<u64>,
        ack: Acknowledgment,
    ) -> bool {
        let Some(ack_id) = ack_id else {
            return false;
        };

        let event = OutboundEvent::SendResult { ack_id, ack };
        match self.message_pusher.push_to(sender, &event).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to acknowledge send {}: {}", ack_id, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DeliveryFailure, MockMessagePusher};

    #[tokio::test]
    async fn test_ack_is_pushed_once_to_sender() {
        // テスト項目: ackId 付きの送信には送信者へ 1 回だけ結果が返る
        // given (前提条件):
        let sender = ConnectionId::generate();
        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_push_to()
            .withf(move |id, event| {
                *id == sender
                    && *event
                        == OutboundEvent::SendResult {
                            ack_id: 1,
                            ack: Acknowledgment::failed(DeliveryFailure::RecipientOffline),
                        }
            })
            .times(1)
            .returning(|_, _| Ok(()));
        let usecase = AcknowledgeSendUseCase::new(Arc::new(pusher));

        // when (操作):
        let sent = usecase
            .execute(
                &sender,
                Some(1),
                Acknowledgment::failed(DeliveryFailure::RecipientOffline),
            )
            .await;

        // then (期待する結果):
        assert!(sent);
    }

    #[tokio::test]
    async fn test_no_ack_without_ack_id() {
        // テスト項目: ackId のない送信には何も返さない
        // given (前提条件):
        let mut pusher = MockMessagePusher::new();
        pusher.expect_push_to().never();
        let usecase = AcknowledgeSendUseCase::new(Arc::new(pusher));

        // when (操作):
        let sent = usecase
            .execute(&ConnectionId::generate(), None, Acknowledgment::delivered())
            .await;

        // then (期待する結果):
        assert!(!sent);
    }
}
