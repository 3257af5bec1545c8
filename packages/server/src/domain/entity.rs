//! エンティティ
//!
//! - `Connection`: 1 本のライブな双方向チャンネル（表示名とルーム所属を持つ）
//! - `Message`: ルーティング時に確定する不変のメッセージ
//! - `OutboundEvent`: クライアントへ送り出すイベント（DTO への変換は Infrastructure 層が担当）

use std::collections::BTreeSet;

use super::{
    error::{DeliveryFailure, DomainError},
    value_object::{ConnectionId, DisplayName, MessageText, RoomId, Timestamp},
};

/// 接続エンティティ
///
/// 生成直後は表示名を持たず、プレゼンスには現れない。
/// `join` されると表示名と join 順序（`join_seq`）が割り当てられる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnectionId,
    pub display_name: Option<DisplayName>,
    pub rooms: BTreeSet<RoomId>,
    /// 最後に join した順序。プレゼンスの並びと同名時の宛先選択に使う
    pub join_seq: Option<u64>,
}

impl Connection {
    pub fn new(id: ConnectionId) -> Self {
        Self {
            id,
            display_name: None,
            rooms: BTreeSet::new(),
            join_seq: None,
        }
    }

    pub fn is_joined(&self) -> bool {
        self.display_name.is_some()
    }

    /// 表示名を割り当てる（再 join は後勝ち）
    pub fn join(&mut self, display_name: DisplayName, join_seq: u64) {
        self.display_name = Some(display_name);
        self.join_seq = Some(join_seq);
    }

    /// ルームに参加する。既に参加済みなら false
    pub fn join_room(&mut self, room_id: RoomId) -> bool {
        self.rooms.insert(room_id)
    }

    /// ルームから退出する。参加していなければ false
    pub fn leave_room(&mut self, room_id: &RoomId) -> bool {
        self.rooms.remove(room_id)
    }

    pub fn is_member_of(&self, room_id: &RoomId) -> bool {
        self.rooms.contains(room_id)
    }
}

/// 添付ファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub mime_type: String,
    pub content: Vec<u8>,
}

impl Attachment {
    pub fn new(
        name: String,
        mime_type: String,
        content: Vec<u8>,
        max_bytes: usize,
    ) -> Result<Self, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::EmptyAttachmentName);
        }
        if content.len() > max_bytes {
            return Err(DomainError::AttachmentTooLarge {
                max: max_bytes,
                actual: content.len(),
            });
        }
        Ok(Self {
            name,
            mime_type,
            content,
        })
    }
}

/// メッセージ本体
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(MessageText),
    File(Attachment),
}

/// 配送範囲
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryScope {
    Broadcast,
    Room(RoomId),
    Direct(DisplayName),
}

/// ルーティング済みメッセージ
///
/// `server_timestamp` は常にサーバーの時計で付与される。
/// `client_timestamp` は表示順のヒントと送信者側の突き合わせ（送信者 + クライアント時刻）にのみ使う。
/// 形式は問わず（数値・`"10:42"` のような文字列など）、受け取った値をそのまま返す。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub sender: DisplayName,
    pub payload: Payload,
    pub server_timestamp: Timestamp,
    pub client_timestamp: Option<serde_json::Value>,
    pub scope: DeliveryScope,
}

/// 送信結果（ハンドオフ ack）
///
/// サーバーが送信を受け付けて配送したことを示すだけで、既読通知ではない。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acknowledgment {
    pub delivered: bool,
    pub reason: Option<DeliveryFailure>,
}

impl Acknowledgment {
    pub fn delivered() -> Self {
        Self {
            delivered: true,
            reason: None,
        }
    }

    pub fn failed(reason: DeliveryFailure) -> Self {
        Self {
            delivered: false,
            reason: Some(reason),
        }
    }
}

/// クライアントへ送り出すイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEvent {
    /// 全接続へのプレゼンス全量
    PresenceUpdate { display_names: Vec<DisplayName> },
    /// 配送されるメッセージ。`self_originated` は送信者へのエコーであることを示す
    Message {
        message: Message,
        self_originated: bool,
    },
    TypingStarted { sender: DisplayName },
    TypingStopped { sender: DisplayName },
    /// 送信者だけに返す 1 回限りの送信結果
    SendResult { ack_id: u64, ack: Acknowledgment },
}
