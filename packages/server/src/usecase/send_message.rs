//! UseCase: メッセージルーティング
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ブロードキャスト：送信者を含む join 済みの全接続へ配送
//! - ルーム：ルームに参加している接続だけへ配送（送信者の参加は不要）
//! - ダイレクト：表示名で宛先を引き、宛先 1 接続 + 送信者へのエコー
//!
//! ### なぜこのテストが必要か
//! - 配送範囲の誤りは他人宛てメッセージの漏洩や欠落につながる
//! - 送信者への ack（ハンドオフ ack）が配送結果と一致することを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：各スコープの配送
//! - 異常系：オフラインの宛先、未 join の送信者、宛先の送信キュー満杯
//! - エッジケース：同名の接続が複数ある場合、自分自身宛てのダイレクト

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::domain::{
    Acknowledgment, ConnectionId, ConnectionRepository, DeliveryFailure, DeliveryScope,
    DisplayName, Message, MessagePushError, MessagePusher, OutboundEvent, Payload, RoomId,
    Timestamp,
};

/// メッセージルーティングのユースケース
pub struct SendMessageUseCase {
    repository: Arc<dyn ConnectionRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    /// サーバー時刻の付与に使う時計
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    pub fn new(
        repository: Arc<dyn ConnectionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            clock,
        }
    }

    /// 送信者を含む join 済みの全接続へ配送する
    pub async fn route_broadcast(
        &self,
        sender: &ConnectionId,
        payload: Payload,
        client_timestamp: Option<serde_json::Value>,
    ) -> Acknowledgment {
        let Some(sender_name) = self.resolve_sender(sender).await else {
            return Acknowledgment::failed(DeliveryFailure::NotJoined);
        };

        let message = self.stamp(
            sender_name,
            payload,
            client_timestamp,
            DeliveryScope::Broadcast,
        );
        let targets = self.repository.joined_connection_ids().await;
        self.fanout(targets, message).await;

        Acknowledgment::delivered()
    }

    /// ルームに参加している接続へ配送する（送信者の参加は問わない）
    pub async fn route_to_room(
        &self,
        sender: &ConnectionId,
        room_id: RoomId,
        payload: Payload,
        client_timestamp: Option<serde_json::Value>,
    ) -> Acknowledgment {
        let Some(sender_name) = self.resolve_sender(sender).await else {
            return Acknowledgment::failed(DeliveryFailure::NotJoined);
        };

        let targets = self.repository.room_members(&room_id).await;
        let message = self.stamp(
            sender_name,
            payload,
            client_timestamp,
            DeliveryScope::Room(room_id),
        );
        self.fanout(targets, message).await;

        Acknowledgment::delivered()
    }

    /// 表示名で宛先を引いて 1 接続へ配送し、送信者へエコーする
    ///
    /// 同名の接続が複数あれば最も早く join した接続だけが受け取る。
    /// 宛先が見つからなければ何も配送せず `RecipientOffline` を返す。
    pub async fn route_direct(
        &self,
        sender: &ConnectionId,
        target: DisplayName,
        payload: Payload,
        client_timestamp: Option<serde_json::Value>,
    ) -> Acknowledgment {
        let Some(sender_name) = self.resolve_sender(sender).await else {
            return Acknowledgment::failed(DeliveryFailure::NotJoined);
        };

        let Some(target_id) = self.repository.find_by_display_name(&target).await else {
            tracing::info!(
                "Direct message from '{}' to '{}' dropped: recipient offline",
                sender_name,
                target
            );
            return Acknowledgment::failed(DeliveryFailure::RecipientOffline);
        };

        let message = self.stamp(
            sender_name,
            payload,
            client_timestamp,
            DeliveryScope::Direct(target),
        );

        // 自分自身宛てならエコー 1 通だけ
        if target_id == *sender {
            return self.deliver_direct(&target_id, message, true).await;
        }

        let ack = self.deliver_direct(&target_id, message.clone(), false).await;
        if ack.delivered {
            let echo = OutboundEvent::Message {
                message,
                self_originated: true,
            };
            if let Err(e) = self.message_pusher.push_to(sender, &echo).await {
                tracing::warn!("Failed to echo direct message to sender: {}", e);
            }
        }
        ack
    }

    async fn resolve_sender(&self, sender: &ConnectionId) -> Option<DisplayName> {
        let display_name = self
            .repository
            .get(sender)
            .await
            .and_then(|c| c.display_name);
        if display_name.is_none() {
            tracing::warn!("Connection '{}' tried to send before joining", sender);
        }
        display_name
    }

    fn stamp(
        &self,
        sender: DisplayName,
        payload: Payload,
        client_timestamp: Option<serde_json::Value>,
        scope: DeliveryScope,
    ) -> Message {
        Message {
            sender,
            payload,
            server_timestamp: Timestamp::new(self.clock.now_millis()),
            client_timestamp,
            scope,
        }
    }

    async fn fanout(&self, targets: Vec<ConnectionId>, message: Message) {
        let event = OutboundEvent::Message {
            message,
            self_originated: false,
        };
        let total = targets.len();
        match self.message_pusher.broadcast(targets, &event).await {
            Ok(delivered) => {
                tracing::debug!("Fanned out message to {}/{} connection(s)", delivered, total)
            }
            Err(e) => tracing::warn!("Failed to fan out message: {}", e),
        }
    }

    async fn deliver_direct(
        &self,
        target_id: &ConnectionId,
        message: Message,
        self_originated: bool,
    ) -> Acknowledgment {
        let event = OutboundEvent::Message {
            message,
            self_originated,
        };
        match self.message_pusher.push_to(target_id, &event).await {
            Ok(()) => Acknowledgment::delivered(),
            Err(MessagePushError::OutboundBackpressure(id)) => {
                tracing::warn!("Direct message to '{}' dropped: outbound queue full", id);
                Acknowledgment::failed(DeliveryFailure::OutboundBackpressure)
            }
            Err(e) => {
                tracing::warn!("Direct message dropped: {}", e);
                Acknowledgment::failed(DeliveryFailure::RecipientOffline)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MessageText, OutboundFrame},
        infrastructure::{
            message_pusher::WebSocketMessagePusher, repository::InMemoryConnectionRepository,
        },
    };
    use hiroba_shared::time::FixedClock;
    use tokio::sync::mpsc;

    const NOW: i64 = 1672531200000;

    struct Fixture {
        repository: Arc<InMemoryConnectionRepository>,
        pusher: Arc<WebSocketMessagePusher>,
        usecase: SendMessageUseCase,
    }

    fn fixture() -> Fixture {
        let repository = Arc::new(InMemoryConnectionRepository::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = SendMessageUseCase::new(
            repository.clone(),
            pusher.clone(),
            Arc::new(FixedClock::new(NOW)),
        );
        Fixture {
            repository,
            pusher,
            usecase,
        }
    }

    async fn connect(
        fixture: &Fixture,
        display_name: Option<&str>,
        capacity: usize,
    ) -> (ConnectionId, mpsc::Receiver<OutboundFrame>) {
        let (tx, rx) = mpsc::channel(capacity);
        let id = ConnectionId::generate();
        fixture.repository.register(id).await;
        fixture.pusher.register_client(id, tx).await;
        if let Some(display_name) = display_name {
            fixture
                .repository
                .join(&id, DisplayName::new(display_name.to_string()).unwrap())
                .await
                .unwrap();
        }
        (id, rx)
    }

    fn text(value: &str) -> Payload {
        Payload::Text(MessageText::new(value.to_string()).unwrap())
    }

    fn name(value: &str) -> DisplayName {
        DisplayName::new(value.to_string()).unwrap()
    }

    fn room(value: &str) -> RoomId {
        RoomId::new(value.to_string()).unwrap()
    }

    fn recv_json(rx: &mut mpsc::Receiver<OutboundFrame>) -> serde_json::Value {
        serde_json::from_str(rx.try_recv().unwrap().as_str()).unwrap()
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_joined_connection_including_sender() {
        // テスト項目: ブロードキャストは送信者を含む join 済みの全接続へ配送される
        // given (前提条件):
        let fixture = fixture();
        let (alice, mut alice_rx) = connect(&fixture, Some("alice"), 8).await;
        let (_bob, mut bob_rx) = connect(&fixture, Some("bob"), 8).await;
        let (_lurker, mut lurker_rx) = connect(&fixture, None, 8).await;

        // when (操作):
        let ack = fixture
            .usecase
            .route_broadcast(&alice, text("hi"), Some(serde_json::json!(99)))
            .await;

        // then (期待する結果):
        assert_eq!(ack, Acknowledgment::delivered());
        let expected = serde_json::json!({
            "type": "message_broadcast",
            "sender": "alice",
            "text": "hi",
            "serverTimestamp": "2023-01-01T00:00:00.000Z",
            "clientTimestamp": 99,
        });
        assert_eq!(recv_json(&mut alice_rx), expected);
        assert_eq!(recv_json(&mut bob_rx), expected);
        // join 前の接続には配送されない
        assert!(lurker_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_from_unjoined_sender_is_rejected() {
        // テスト項目: join 前の送信者のブロードキャストは配送されず NotJoined になる
        // given (前提条件):
        let fixture = fixture();
        let (lurker, _lurker_rx) = connect(&fixture, None, 8).await;
        let (_bob, mut bob_rx) = connect(&fixture, Some("bob"), 8).await;

        // when (操作):
        let ack = fixture.usecase.route_broadcast(&lurker, text("hi"), None).await;

        // then (期待する結果):
        assert_eq!(ack, Acknowledgment::failed(DeliveryFailure::NotJoined));
        assert!(bob_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_room_message_reaches_members_only() {
        // テスト項目: ルームメッセージはメンバーだけに届き、送信者がメンバーでなくても送れる
        // given (前提条件):
        let fixture = fixture();
        let (alice, mut alice_rx) = connect(&fixture, Some("alice"), 8).await;
        let (bob, mut bob_rx) = connect(&fixture, Some("bob"), 8).await;
        let (_carol, mut carol_rx) = connect(&fixture, Some("carol"), 8).await;
        fixture.repository.join_room(&bob, room("general")).await.unwrap();

        // when (操作):
        let ack = fixture
            .usecase
            .route_to_room(&alice, room("general"), text("hello room"), None)
            .await;

        // then (期待する結果):
        assert_eq!(ack, Acknowledgment::delivered());
        let received = recv_json(&mut bob_rx);
        assert_eq!(received["type"], "message_room");
        assert_eq!(received["roomId"], "general");
        assert_eq!(received["sender"], "alice");
        assert!(alice_rx.try_recv().is_err());
        assert!(carol_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_direct_message_to_offline_recipient() {
        // テスト項目: オフラインの宛先へのダイレクトは RecipientOffline となり、誰にも配送されない
        // given (前提条件):
        let fixture = fixture();
        let (alice, mut alice_rx) = connect(&fixture, Some("alice"), 8).await;
        let (_bob, mut bob_rx) = connect(&fixture, Some("bob"), 8).await;

        // when (操作):
        let ack = fixture
            .usecase
            .route_direct(&alice, name("carol"), text("psst"), None)
            .await;

        // then (期待する結果):
        assert_eq!(ack, Acknowledgment::failed(DeliveryFailure::RecipientOffline));
        assert!(alice_rx.try_recv().is_err());
        assert!(bob_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_direct_message_delivers_once_and_echoes_to_sender() {
        // テスト項目: ダイレクトは宛先へ 1 通届き、送信者には self: true のエコーが届く
        // given (前提条件):
        let fixture = fixture();
        let (alice, mut alice_rx) = connect(&fixture, Some("alice"), 8).await;
        let (_bob, mut bob_rx) = connect(&fixture, Some("bob"), 8).await;
        let (_carol, mut carol_rx) = connect(&fixture, Some("carol"), 8).await;

        // when (操作):
        let ack = fixture
            .usecase
            .route_direct(&alice, name("bob"), text("psst"), Some(serde_json::json!(5)))
            .await;

        // then (期待する結果):
        assert_eq!(ack, Acknowledgment::delivered());
        let to_bob = recv_json(&mut bob_rx);
        assert_eq!(to_bob["type"], "message_direct");
        assert_eq!(to_bob["self"], false);
        assert!(bob_rx.try_recv().is_err());

        let echo = recv_json(&mut alice_rx);
        assert_eq!(echo["type"], "message_direct");
        assert_eq!(echo["target"], "bob");
        assert_eq!(echo["self"], true);
        assert_eq!(echo["clientTimestamp"], 5);

        assert!(carol_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_direct_message_with_duplicate_names_reaches_exactly_one() {
        // テスト項目: 同名の接続が複数ある場合、最も早く join した 1 接続だけが受け取る
        // given (前提条件):
        let fixture = fixture();
        let (alice, _alice_rx) = connect(&fixture, Some("alice"), 8).await;
        let (_bob1, mut bob1_rx) = connect(&fixture, Some("bob"), 8).await;
        let (_bob2, mut bob2_rx) = connect(&fixture, Some("bob"), 8).await;

        // when (操作):
        let ack = fixture
            .usecase
            .route_direct(&alice, name("bob"), text("which bob?"), None)
            .await;

        // then (期待する結果):
        assert!(ack.delivered);
        assert!(bob1_rx.try_recv().is_ok());
        assert!(bob2_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_direct_message_to_self_is_delivered_once() {
        // テスト項目: 自分自身宛てのダイレクトは 1 通だけ届く
        // given (前提条件):
        let fixture = fixture();
        let (alice, mut alice_rx) = connect(&fixture, Some("alice"), 8).await;

        // when (操作):
        let ack = fixture
            .usecase
            .route_direct(&alice, name("alice"), text("note to self"), None)
            .await;

        // then (期待する結果):
        assert!(ack.delivered);
        assert_eq!(recv_json(&mut alice_rx)["self"], true);
        assert!(alice_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_direct_message_to_full_queue_is_not_echoed() {
        // テスト項目: 宛先の送信キューが満杯なら配送失敗となり、送信者へのエコーもしない
        // given (前提条件):
        let fixture = fixture();
        let (alice, mut alice_rx) = connect(&fixture, Some("alice"), 8).await;
        let (_bob, _bob_rx) = connect(&fixture, Some("bob"), 1).await;
        fixture
            .usecase
            .route_direct(&alice, name("bob"), text("first"), None)
            .await;
        let _ = alice_rx.try_recv();

        // when (操作):
        let ack = fixture
            .usecase
            .route_direct(&alice, name("bob"), text("second"), None)
            .await;

        // then (期待する結果):
        assert_eq!(
            ack,
            Acknowledgment::failed(DeliveryFailure::OutboundBackpressure)
        );
        assert!(alice_rx.try_recv().is_err());
    }
}
