//! Server state shared by the handlers.

use std::sync::Arc;

use crate::{config::ServerConfig, usecase::GetPresenceUseCase};

use super::dispatcher::EventDispatcher;

/// Shared application state
pub struct AppState {
    /// Serialized entry point for every WebSocket event
    pub dispatcher: Arc<EventDispatcher>,
    /// GetPresenceUseCase（プレゼンス取得のユースケース）
    pub get_presence_usecase: Arc<GetPresenceUseCase>,
    pub config: ServerConfig,
}
