//! ドメイン層
//!
//! 接続（Connection）、メッセージ（Message）、ルーム所属などのドメインモデルと、
//! ドメイン層が必要とするインターフェース（Repository, MessagePusher）を定義します。

pub mod entity;
pub mod error;
pub mod pusher;
pub mod repository;
pub mod value_object;

pub use entity::{
    Acknowledgment, Attachment, Connection, DeliveryScope, Message, OutboundEvent, Payload,
};
pub use error::{DeliveryFailure, DomainError, MessagePushError, RepositoryError};
pub use pusher::{MessagePusher, OutboundFrame, PusherChannel};
pub use repository::ConnectionRepository;
pub use value_object::{ConnectionId, DisplayName, MessageText, RoomId, Timestamp};

#[cfg(test)]
pub use pusher::MockMessagePusher;
