//! Repository trait 定義
//!
//! ドメイン層が必要とする接続レジストリへのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{Connection, ConnectionId, DisplayName, RepositoryError, RoomId};

/// Connection Repository trait
///
/// 「誰がオンラインか」の唯一の情報源。接続 ID をキーに表示名とルーム所属を保持する。
/// 各メソッドは単体でアトミックに実行される。
#[async_trait]
pub trait ConnectionRepository: Send + Sync {
    /// 未 join の接続を登録
    async fn register(&self, connection_id: ConnectionId);

    /// 表示名を割り当てて join 状態にする（再 join は後勝ち）
    async fn join(
        &self,
        connection_id: &ConnectionId,
        display_name: DisplayName,
    ) -> Result<(), RepositoryError>;

    /// 接続を削除し、削除したエントリを返す（未登録なら `None`）
    async fn remove(&self, connection_id: &ConnectionId) -> Option<Connection>;

    /// 接続を取得
    async fn get(&self, connection_id: &ConnectionId) -> Option<Connection>;

    /// join 済み接続の表示名（join 順）
    async fn list_display_names(&self) -> Vec<DisplayName>;

    /// join 済み接続の ID（join 順）
    async fn joined_connection_ids(&self) -> Vec<ConnectionId>;

    /// 登録済みの全接続の ID（join 済みかどうかを問わない）
    async fn all_connection_ids(&self) -> Vec<ConnectionId>;

    /// 表示名で接続を検索。同名が複数あれば最も早く join した接続を返す
    async fn find_by_display_name(&self, display_name: &DisplayName) -> Option<ConnectionId>;

    /// ルームに参加（既に参加済みなら false）
    async fn join_room(
        &self,
        connection_id: &ConnectionId,
        room_id: RoomId,
    ) -> Result<bool, RepositoryError>;

    /// ルームから退出（参加していなければ false）
    async fn leave_room(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
    ) -> Result<bool, RepositoryError>;

    /// ルームに参加している接続の ID
    async fn room_members(&self, room_id: &RoomId) -> Vec<ConnectionId>;

    /// 登録済みの接続数
    async fn count_connections(&self) -> usize;
}
