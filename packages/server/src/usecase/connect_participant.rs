//! UseCase: 接続受付処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::execute() メソッド
//! - 新しい接続が未 join の状態で登録されること
//!
//! ### なぜこのテストが必要か
//! - join 前の接続はプレゼンスに現れてはならない
//! - 送信キューが MessagePusher に登録され、プレゼンス配信を受けられること

use std::sync::Arc;

use crate::domain::{ConnectionId, ConnectionRepository, MessagePusher, PusherChannel};

/// 接続受付のユースケース
pub struct ConnectParticipantUseCase {
    /// Repository（接続レジストリの抽象化）
    repository: Arc<dyn ConnectionRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectParticipantUseCase {
    /// 新しい ConnectParticipantUseCase を作成
    pub fn new(
        repository: Arc<dyn ConnectionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 接続を受け付けて接続 ID を払い出す
    ///
    /// # Arguments
    ///
    /// * `sender` - クライアントへの送信キュー
    pub async fn execute(&self, sender: PusherChannel) -> ConnectionId {
        let connection_id = ConnectionId::generate();

        // 1. Repository に未 join の接続として登録
        self.repository.register(connection_id).await;

        // 2. MessagePusher に送信キューを登録
        self.message_pusher
            .register_client(connection_id, sender)
            .await;

        connection_id
    }
}
