//! UseCase 層のエラー型

use thiserror::Error;

/// join 処理のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    #[error("connection '{0}' is not registered")]
    ConnectionNotFound(String),
}

/// ルーム参加・退出のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("connection '{0}' is not registered")]
    ConnectionNotFound(String),
    /// ルームに入れるのは join 済みの接続だけ
    #[error("connection '{0}' has not joined")]
    NotJoined(String),
}

/// タイピング通知のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypingError {
    /// 表示名が未設定の接続からのタイピング通知
    #[error("connection '{0}' has not joined")]
    NotJoined(String),
}
