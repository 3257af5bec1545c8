//! UseCase: ルームへの参加・退出

use std::sync::Arc;

use crate::domain::{ConnectionId, ConnectionRepository, RepositoryError, RoomId};

use super::error::RoomError;

/// ルーム参加・退出のユースケース
pub struct ManageRoomUseCase {
    repository: Arc<dyn ConnectionRepository>,
}

impl ManageRoomUseCase {
    pub fn new(repository: Arc<dyn ConnectionRepository>) -> Self {
        Self { repository }
    }

    /// ルームに参加する。新たに参加した場合は true
    ///
    /// ブロードキャストと同じく、表示名を持たない接続はルームメッセージを受け取れない。
    pub async fn join_room(
        &self,
        connection_id: &ConnectionId,
        room_id: RoomId,
    ) -> Result<bool, RoomError> {
        let connection = self
            .repository
            .get(connection_id)
            .await
            .ok_or_else(|| RoomError::ConnectionNotFound(connection_id.to_string()))?;
        if !connection.is_joined() {
            return Err(RoomError::NotJoined(connection_id.to_string()));
        }

        self.repository
            .join_room(connection_id, room_id)
            .await
            .map_err(into_room_error)
    }

    /// ルームから退出する。参加していた場合は true
    pub async fn leave_room(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
    ) -> Result<bool, RoomError> {
        self.repository
            .leave_room(connection_id, room_id)
            .await
            .map_err(into_room_error)
    }
}

fn into_room_error(error: RepositoryError) -> RoomError {
    match error {
        RepositoryError::ConnectionNotFound(id) => RoomError::ConnectionNotFound(id),
    }
}
