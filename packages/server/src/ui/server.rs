//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{config::ServerConfig, usecase::GetPresenceUseCase};

use super::{
    dispatcher::EventDispatcher,
    handler::{get_presence, health_check, root, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Presence and message-fanout server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(dispatcher, get_presence_usecase, ServerConfig::default());
/// server.run().await?;
/// ```
pub struct Server {
    /// EventDispatcher（WebSocket イベントの振り分け）
    dispatcher: Arc<EventDispatcher>,
    /// GetPresenceUseCase（プレゼンス取得のユースケース）
    get_presence_usecase: Arc<GetPresenceUseCase>,
    config: ServerConfig,
}

impl Server {
    pub fn new(
        dispatcher: Arc<EventDispatcher>,
        get_presence_usecase: Arc<GetPresenceUseCase>,
        config: ServerConfig,
    ) -> Self {
        Self {
            dispatcher,
            get_presence_usecase,
            config,
        }
    }

    /// Build the router with all endpoints
    pub fn router(self) -> Router {
        let app_state = Arc::new(AppState {
            dispatcher: self.dispatcher,
            get_presence_usecase: self.get_presence_usecase,
            config: self.config,
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/", get(root))
            .route("/api/health", get(health_check))
            .route("/api/presence", get(get_presence))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(app_state)
    }

    /// Bind to the configured address and serve until Ctrl+C or SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the configured address or
    /// if there's an error during server execution.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let bind_addr = self.config.bind_addr();
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(
        self,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!("Chat server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
