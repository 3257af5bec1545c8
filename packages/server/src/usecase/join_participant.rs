//! UseCase: 表示名の登録（join）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinParticipantUseCase::execute() メソッド
//! - join のたびにプレゼンスがちょうど 1 回配信されること
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規 join、再 join（後勝ち）
//! - 異常系：未登録の接続からの join

use std::sync::Arc;

use crate::domain::{ConnectionId, ConnectionRepository, DisplayName, RepositoryError};

use super::{error::JoinError, publish_presence::PublishPresenceUseCase};

/// join のユースケース
pub struct JoinParticipantUseCase {
    repository: Arc<dyn ConnectionRepository>,
    publish_presence: Arc<PublishPresenceUseCase>,
}

impl JoinParticipantUseCase {
    pub fn new(
        repository: Arc<dyn ConnectionRepository>,
        publish_presence: Arc<PublishPresenceUseCase>,
    ) -> Self {
        Self {
            repository,
            publish_presence,
        }
    }

    /// 表示名を割り当て、更新後のプレゼンスを全接続へ配信する
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<DisplayName>)` - 配信したプレゼンス
    /// * `Err(JoinError)` - 接続が登録されていない
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        display_name: DisplayName,
    ) -> Result<Vec<DisplayName>, JoinError> {
        self.repository
            .join(connection_id, display_name)
            .await
            .map_err(|e| match e {
                RepositoryError::ConnectionNotFound(id) => JoinError::ConnectionNotFound(id),
            })?;

        Ok(self.publish_presence.execute().await)
    }
}
