//! UseCase: プレゼンスの取得（HTTP API 用、読み取り専用）

use std::sync::Arc;

use crate::domain::{ConnectionRepository, DisplayName};

/// ある時点のプレゼンス
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceSnapshot {
    /// join 済み接続の表示名（join 順）
    pub display_names: Vec<DisplayName>,
    /// join 前を含むライブな接続数
    pub connections: usize,
}

/// プレゼンス取得のユースケース
pub struct GetPresenceUseCase {
    repository: Arc<dyn ConnectionRepository>,
}

impl GetPresenceUseCase {
    pub fn new(repository: Arc<dyn ConnectionRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self) -> PresenceSnapshot {
        PresenceSnapshot {
            display_names: self.repository.list_display_names().await,
            connections: self.repository.count_connections().await,
        }
    }
}
