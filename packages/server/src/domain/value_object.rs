//! 値オブジェクト
//!
//! 生成時にバリデーションを行い、不正な値が存在しないことを型で保証します。

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::DomainError;

/// 表示名の最大文字数
pub const MAX_DISPLAY_NAME_CHARS: usize = 64;

/// ルーム ID の最大文字数
pub const MAX_ROOM_ID_CHARS: usize = 64;

/// 接続 ID
///
/// サーバーが接続ごとに払い出す不透明な識別子。接続が生きている間は再利用されない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// 新しい接続 ID を払い出す
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 表示名
///
/// 前後の空白は取り除かれる。一意性は要求しない（同名の接続が複数存在しうる）。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(value: String) -> Result<Self, DomainError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyDisplayName);
        }
        let chars = trimmed.chars().count();
        if chars > MAX_DISPLAY_NAME_CHARS {
            return Err(DomainError::DisplayNameTooLong {
                max: MAX_DISPLAY_NAME_CHARS,
                actual: chars,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ルーム ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(value: String) -> Result<Self, DomainError> {
        if value.trim().is_empty() {
            return Err(DomainError::EmptyRoomId);
        }
        let chars = value.chars().count();
        if chars > MAX_ROOM_ID_CHARS {
            return Err(DomainError::RoomIdTooLong {
                max: MAX_ROOM_ID_CHARS,
                actual: chars,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// テキストメッセージ本文（空白のみは不可）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageText(String);

impl MessageText {
    pub fn new(value: String) -> Result<Self, DomainError> {
        if value.trim().is_empty() {
            return Err(DomainError::EmptyMessage);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MessageText {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unix タイムスタンプ（UTC, ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_is_trimmed() {
        // テスト項目: 表示名の前後の空白が取り除かれる
        // given (前提条件):
        let raw = "  alice \n".to_string();

        // when (操作):
        let name = DisplayName::new(raw).unwrap();

        // then (期待する結果):
        assert_eq!(name.as_str(), "alice");
    }

    #[test]
    fn test_display_name_rejects_blank() {
        // テスト項目: 空白のみの表示名はエラーになる
        // given (前提条件):
        let raw = "   ".to_string();

        // when (操作):
        let result = DisplayName::new(raw);

        // then (期待する結果):
        assert_eq!(result, Err(DomainError::EmptyDisplayName));
    }

    #[test]
    fn test_display_name_length_is_counted_in_chars() {
        // テスト項目: 表示名の長さはバイト数ではなく文字数で判定される
        // given (前提条件):
        let at_limit = "あ".repeat(MAX_DISPLAY_NAME_CHARS);
        let over_limit = "あ".repeat(MAX_DISPLAY_NAME_CHARS + 1);

        // when (操作):
        let ok = DisplayName::new(at_limit);
        let err = DisplayName::new(over_limit);

        // then (期待する結果):
        assert!(ok.is_ok());
        assert_eq!(
            err,
            Err(DomainError::DisplayNameTooLong {
                max: MAX_DISPLAY_NAME_CHARS,
                actual: MAX_DISPLAY_NAME_CHARS + 1,
            })
        );
    }

    #[test]
    fn test_room_id_rejects_empty() {
        // テスト項目: 空のルーム ID はエラーになる
        // given (前提条件):
        let raw = String::new();

        // when (操作):
        let result = RoomId::new(raw);

        // then (期待する結果):
        assert_eq!(result, Err(DomainError::EmptyRoomId));
    }

    #[test]
    fn test_message_text_rejects_whitespace_only() {
        // テスト項目: 空白のみのメッセージ本文はエラーになる
        // given (前提条件):
        let raw = " \t ".to_string();

        // when (操作):
        let result = MessageText::new(raw);

        // then (期待する結果):
        assert_eq!(result, Err(DomainError::EmptyMessage));
    }

    #[test]
    fn test_connection_ids_are_unique() {
        // テスト項目: 払い出される接続 ID が重複しない
        // given (前提条件):

        // when (操作):
        let first = ConnectionId::generate();
        let second = ConnectionId::generate();

        // then (期待する結果):
        assert_ne!(first, second);
    }
}
