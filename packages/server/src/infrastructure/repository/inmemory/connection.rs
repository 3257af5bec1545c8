//! InMemory Connection Repository 実装
//!
//! ドメイン層が定義する ConnectionRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。永続化はしません。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    Connection, ConnectionId, ConnectionRepository, DisplayName, RepositoryError, RoomId,
};

#[derive(Debug, Default)]
struct Registry {
    connections: HashMap<ConnectionId, Connection>,
    /// 次に割り当てる join 順序
    next_join_seq: u64,
}

impl Registry {
    /// join 済み接続を join 順に並べる
    fn joined_in_order(&self) -> Vec<&Connection> {
        let mut joined: Vec<&Connection> = self
            .connections
            .values()
            .filter(|c| c.is_joined())
            .collect();
        joined.sort_by_key(|c| c.join_seq);
        joined
    }
}

/// インメモリ Connection Repository 実装
///
/// 全操作を 1 つの Mutex で直列化します。
#[derive(Debug, Default)]
pub struct InMemoryConnectionRepository {
    registry: Mutex<Registry>,
}

impl InMemoryConnectionRepository {
    /// 新しい InMemoryConnectionRepository を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionRepository for InMemoryConnectionRepository {
    async fn register(&self, connection_id: ConnectionId) {
        let mut registry = self.registry.lock().await;
        registry
            .connections
            .entry(connection_id)
            .or_insert_with(|| Connection::new(connection_id));
    }

    async fn join(
        &self,
        connection_id: &ConnectionId,
        display_name: DisplayName,
    ) -> Result<(), RepositoryError> {
        let mut registry = self.registry.lock().await;
        let join_seq = registry.next_join_seq;
        let connection = registry
            .connections
            .get_mut(connection_id)
            .ok_or_else(|| RepositoryError::ConnectionNotFound(connection_id.to_string()))?;
        connection.join(display_name, join_seq);
        registry.next_join_seq += 1;
        Ok(())
    }

    async fn remove(&self, connection_id: &ConnectionId) -> Option<Connection> {
        let mut registry = self.registry.lock().await;
        registry.connections.remove(connection_id)
    }

    async fn get(&self, connection_id: &ConnectionId) -> Option<Connection> {
        let registry = self.registry.lock().await;
        registry.connections.get(connection_id).cloned()
    }

    async fn list_display_names(&self) -> Vec<DisplayName> {
        let registry = self.registry.lock().await;
        registry
            .joined_in_order()
            .into_iter()
            .filter_map(|c| c.display_name.clone())
            .collect()
    }

    async fn joined_connection_ids(&self) -> Vec<ConnectionId> {
        let registry = self.registry.lock().await;
        registry.joined_in_order().into_iter().map(|c| c.id).collect()
    }

    async fn all_connection_ids(&self) -> Vec<ConnectionId> {
        let registry = self.registry.lock().await;
        registry.connections.keys().copied().collect()
    }

    async fn find_by_display_name(&self, display_name: &DisplayName) -> Option<ConnectionId> {
        let registry = self.registry.lock().await;
        registry
            .joined_in_order()
            .into_iter()
            .find(|c| c.display_name.as_ref() == Some(display_name))
            .map(|c| c.id)
    }

    async fn join_room(
        &self,
        connection_id: &ConnectionId,
        room_id: RoomId,
    ) -> Result<bool, RepositoryError> {
        let mut registry = self.registry.lock().await;
        let connection = registry
            .connections
            .get_mut(connection_id)
            .ok_or_else(|| RepositoryError::ConnectionNotFound(connection_id.to_string()))?;
        Ok(connection.join_room(room_id))
    }

    async fn leave_room(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
    ) -> Result<bool, RepositoryError> {
        let mut registry = self.registry.lock().await;
        let connection = registry
            .connections
            .get_mut(connection_id)
            .ok_or_else(|| RepositoryError::ConnectionNotFound(connection_id.to_string()))?;
        Ok(connection.leave_room(room_id))
    }

    async fn room_members(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        let registry = self.registry.lock().await;
        registry
            .connections
            .values()
            .filter(|c| c.is_member_of(room_id))
            .map(|c| c.id)
            .collect()
    }

    async fn count_connections(&self) -> usize {
        let registry = self.registry.lock().await;
        registry.connections.len()
    }
}
