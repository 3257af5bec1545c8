//! UseCase: 切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() メソッド
//! - 接続の削除、送信キューの登録解除、プレゼンスの再配信
//!
//! ### どのような状況を想定しているか
//! - 正常系：join 済み接続の切断（残りの接続へプレゼンス配信）
//! - エッジケース：join 前の切断（エラーにせず、プレゼンスも配信しない）
//! - エッジケース：存在しない接続の切断（冪等）

use std::sync::Arc;

use crate::domain::{Connection, ConnectionId, ConnectionRepository, MessagePusher};

use super::publish_presence::PublishPresenceUseCase;

/// 切断のユースケース
pub struct DisconnectParticipantUseCase {
    repository: Arc<dyn ConnectionRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    publish_presence: Arc<PublishPresenceUseCase>,
}

impl DisconnectParticipantUseCase {
    pub fn new(
        repository: Arc<dyn ConnectionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        publish_presence: Arc<PublishPresenceUseCase>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            publish_presence,
        }
    }

    /// 接続の状態をすべて破棄する
    ///
    /// join 済みだった場合のみ、残りの接続へプレゼンスを配信する。
    ///
    /// # Returns
    ///
    /// 削除した接続（未登録なら `None`）
    pub async fn execute(&self, connection_id: &ConnectionId) -> Option<Connection> {
        // 1. Repository から削除（ルーム所属も同時に消える）
        let removed = self.repository.remove(connection_id).await;

        // 2. MessagePusher から送信キューを登録解除
        self.message_pusher.unregister_client(connection_id).await;

        // 3. join 済みだった場合のみプレゼンスを配信
        if removed.as_ref().is_some_and(Connection::is_joined) {
            self.publish_presence.execute().await;
        }

        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{DisplayName, OutboundFrame, RoomId},
        infrastructure::{
            message_pusher::WebSocketMessagePusher, repository::InMemoryConnectionRepository,
        },
    };
    use tokio::sync::mpsc;

    struct Fixture {
        repository: Arc<InMemoryConnectionRepository>,
        pusher: Arc<WebSocketMessagePusher>,
        usecase: DisconnectParticipantUseCase,
    }

    fn fixture() -> Fixture {
        let repository = Arc::new(InMemoryConnectionRepository::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let publish = Arc::new(PublishPresenceUseCase::new(
            repository.clone(),
            pusher.clone(),
        ));
        let usecase = DisconnectParticipantUseCase::new(repository.clone(), pusher.clone(), publish);
        Fixture {
            repository,
            pusher,
            usecase,
        }
    }

    async fn connect(
        fixture: &Fixture,
        display_name: Option<&str>,
    ) -> (ConnectionId, mpsc::Receiver<OutboundFrame>) {
        let (tx, rx) = mpsc::channel(16);
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

    #[tokio::test]
    async fn test_disconnect_joined_connection_publishes_presence() {
        // テスト項目: join 済み接続の切断で残りの接続へプレゼンスが 1 回配信される
        // given (前提条件):
        let fixture = fixture();
        let (_alice, mut alice_rx) = connect(&fixture, Some("alice")).await;
        let (bob, mut bob_rx) = connect(&fixture, Some("bob")).await;

        // when (操作):
        let removed = fixture.usecase.execute(&bob).await;

        // then (期待する結果):
        assert!(removed.is_some_and(|c| c.is_joined()));
        assert_eq!(
            alice_rx.try_recv().unwrap().as_str(),
            r#"{"type":"presence_update","displayNames":["alice"]}"#
        );
        assert!(alice_rx.try_recv().is_err());
        // 切断した本人には送られない
        assert!(bob_rx.try_recv().is_err());
        assert_eq!(fixture.repository.count_connections().await, 1);
    }

    #[tokio::test]
    async fn test_disconnect_before_join_is_silent() {
        // テスト項目: join 前の切断はエラーにならず、プレゼンスも配信されない
        // given (前提条件):
        let fixture = fixture();
        let (_alice, mut alice_rx) = connect(&fixture, Some("alice")).await;
        let (lurker, _lurker_rx) = connect(&fixture, None).await;

        // when (操作):
        let removed = fixture.usecase.execute(&lurker).await;

        // then (期待する結果):
        assert!(removed.is_some_and(|c| !c.is_joined()));
        assert!(alice_rx.try_recv().is_err());
        assert_eq!(fixture.repository.count_connections().await, 1);
    }

    #[tokio::test]
    async fn test_disconnect_unknown_connection_is_noop() {
        // テスト項目: 存在しない接続の切断は何もしない（冪等性）
        // given (前提条件):
        let fixture = fixture();
        let (_alice, mut alice_rx) = connect(&fixture, Some("alice")).await;

        // when (操作):
        let removed = fixture.usecase.execute(&ConnectionId::generate()).await;

        // then (期待する結果):
        assert_eq!(removed, None);
        assert!(alice_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_disconnect_purges_room_membership() {
        // テスト項目: 切断した接続のルーム所属が消える
        // given (前提条件):
        let fixture = fixture();
        let (bob, _bob_rx) = connect(&fixture, Some("bob")).await;
        let room = RoomId::new("general".to_string()).unwrap();
        fixture.repository.join_room(&bob, room.clone()).await.unwrap();

        // when (操作):
        fixture.usecase.execute(&bob).await;

        // then (期待する結果):
        assert!(fixture.repository.room_members(&room).await.is_empty());
    }
}
