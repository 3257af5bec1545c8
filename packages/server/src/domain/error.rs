//! ドメイン層のエラー型

use thiserror::Error;

/// 値オブジェクト・エンティティ生成時のバリデーションエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("display name must not be empty")]
    EmptyDisplayName,

    #[error("display name is too long ({actual} chars, max {max})")]
    DisplayNameTooLong { max: usize, actual: usize },

    #[error("room id must not be empty")]
    EmptyRoomId,

    #[error("room id is too long ({actual} chars, max {max})")]
    RoomIdTooLong { max: usize, actual: usize },

    #[error("message must not be empty")]
    EmptyMessage,

    #[error("attachment name must not be empty")]
    EmptyAttachmentName,

    #[error("attachment is too large ({actual} bytes, max {max})")]
    AttachmentTooLarge { max: usize, actual: usize },

    #[error("attachment content is not valid base64: {0}")]
    InvalidAttachmentEncoding(String),

    #[error("payload must contain either text or a complete file")]
    MissingPayload,

    #[error("payload must not contain both text and a file")]
    AmbiguousPayload,
}

/// Repository 操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("connection '{0}' is not registered")]
    ConnectionNotFound(String),
}

/// MessagePusher 操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("client '{0}' is not registered")]
    ClientNotFound(String),

    /// 送信キューが満杯（遅いクライアント）
    #[error("outbound queue of client '{0}' is full")]
    OutboundBackpressure(String),

    /// 接続が既に閉じている
    #[error("transport of client '{0}' is closed")]
    TransportLost(String),

    #[error("failed to encode outbound event: {0}")]
    Encode(String),
}

/// 送信失敗の理由（送信結果の ack に載せて送信者へ返す）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeliveryFailure {
    /// ダイレクトメッセージの宛先がオンラインでない
    #[error("RecipientOffline")]
    RecipientOffline,

    /// 必須フィールドの欠落や不正な値
    #[error("MalformedEvent")]
    MalformedEvent,

    /// 送信者がまだ join していない
    #[error("NotJoined")]
    NotJoined,

    /// 宛先の送信キューが満杯
    #[error("OutboundBackpressure")]
    OutboundBackpressure,
}

impl DeliveryFailure {
    /// ワイヤ上の reason 文字列
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RecipientOffline => "RecipientOffline",
            Self::MalformedEvent => "MalformedEvent",
            Self::NotJoined => "NotJoined",
            Self::OutboundBackpressure => "OutboundBackpressure",
        }
    }
}
