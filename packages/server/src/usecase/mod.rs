//! UseCase 層
//!
//! 接続レジストリ、プレゼンス配信、メッセージルーティング、送信結果（ack）、
//! タイピング通知の各ユースケースを提供します。

pub mod acknowledge_send;
pub mod connect_participant;
pub mod disconnect_participant;
pub mod error;
pub mod get_presence;
pub mod join_participant;
pub mod manage_room;
pub mod notify_typing;
pub mod publish_presence;
pub mod send_message;

pub use acknowledge_send::AcknowledgeSendUseCase;
pub use connect_participant::ConnectParticipantUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{JoinError, RoomError, TypingError};
pub use get_presence::{GetPresenceUseCase, PresenceSnapshot};
pub use join_participant::JoinParticipantUseCase;
pub use manage_room::ManageRoomUseCase;
pub use notify_typing::NotifyTypingUseCase;
pub use publish_presence::PublishPresenceUseCase;
pub use send_message::SendMessageUseCase;
