//! MessagePusher trait 定義
//!
//! クライアントへのイベント送信（通知）の抽象化。
//! 送信はノンブロッキングで行い、遅いクライアントが他のクライアントへの配送を止めてはならない。

use async_trait::async_trait;
use axum::extract::ws::Utf8Bytes;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError, OutboundEvent};

/// エンコード済みの JSON テキストフレーム
///
/// 参照カウントで共有されるため、複数の送信キューへ渡しても本体は 1 つだけ。
pub type OutboundFrame = Utf8Bytes;

/// クライアントごとの送信キュー
pub type PusherChannel = mpsc::Sender<OutboundFrame>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// クライアントの送信キューを登録
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// クライアントの送信キューを登録解除
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// 特定のクライアントへ送信
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &OutboundEvent,
    ) -> Result<(), MessagePushError>;

    /// 複数のクライアントへ送信し、キューに渡せた件数を返す
    ///
    /// 個々の宛先の失敗はログに残して読み捨て、残りの宛先への配送を続ける。
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        event: &OutboundEvent,
    ) -> Result<usize, MessagePushError>;
}
