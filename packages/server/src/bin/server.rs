//! Hiroba presence and message-fanout server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-server
//! cargo run --bin hiroba-server -- --host 0.0.0.0 --port 3000
//! PORT=3000 cargo run --bin hiroba-server
//! ```

use std::sync::Arc;

use clap::Parser;
use hiroba_server::{
    config::{DEFAULT_MAX_ATTACHMENT_BYTES, DEFAULT_OUTBOUND_BUFFER, DEFAULT_PORT, ServerConfig},
    infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::InMemoryConnectionRepository,
    },
    ui::{DispatcherUseCases, EventDispatcher, Server},
    usecase::{
        AcknowledgeSendUseCase, ConnectParticipantUseCase, DisconnectParticipantUseCase,
        GetPresenceUseCase, JoinParticipantUseCase, ManageRoomUseCase, NotifyTypingUseCase,
        PublishPresenceUseCase, SendMessageUseCase,
    },
};
use hiroba_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "hiroba-server")]
#[command(about = "Presence and message-fanout chat server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Frames queued per connection before deliveries to it are dropped
    #[arg(long, env = "HIROBA_OUTBOUND_BUFFER", default_value_t = DEFAULT_OUTBOUND_BUFFER)]
    outbound_buffer: usize,

    /// Maximum decoded size of a file attachment in bytes
    #[arg(
        long,
        env = "HIROBA_MAX_ATTACHMENT_BYTES",
        default_value_t = DEFAULT_MAX_ATTACHMENT_BYTES
    )]
    max_attachment_bytes: usize,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            // mpsc::channel panics on zero capacity
            outbound_buffer: args.outbound_buffer.max(1),
            max_attachment_bytes: args.max_attachment_bytes,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let config = ServerConfig::from(Args::parse());
    tracing::debug!("Starting with {:?}", config);

    // Initialize dependencies in order:
    // 1. Repository
    // 2. MessagePusher
    // 3. UseCases
    // 4. EventDispatcher
    // 5. Server

    // 1. Create Repository (in-memory connection registry)
    let repository = Arc::new(InMemoryConnectionRepository::new());

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. Create UseCases
    let publish_presence_usecase = Arc::new(PublishPresenceUseCase::new(
        repository.clone(),
        message_pusher.clone(),
    ));
    let usecases = DispatcherUseCases {
        connect_participant: Arc::new(ConnectParticipantUseCase::new(
            repository.clone(),
            message_pusher.clone(),
        )),
        join_participant: Arc::new(JoinParticipantUseCase::new(
            repository.clone(),
            publish_presence_usecase.clone(),
        )),
        disconnect_participant: Arc::new(DisconnectParticipantUseCase::new(
            repository.clone(),
            message_pusher.clone(),
            publish_presence_usecase,
        )),
        send_message: Arc::new(SendMessageUseCase::new(
            repository.clone(),
            message_pusher.clone(),
            Arc::new(SystemClock),
        )),
        acknowledge_send: Arc::new(AcknowledgeSendUseCase::new(message_pusher.clone())),
        notify_typing: Arc::new(NotifyTypingUseCase::new(
            repository.clone(),
            message_pusher.clone(),
        )),
        manage_room: Arc::new(ManageRoomUseCase::new(repository.clone())),
    };
    let get_presence_usecase = Arc::new(GetPresenceUseCase::new(repository));

    // 4. Create EventDispatcher
    let dispatcher = Arc::new(EventDispatcher::new(usecases, config.max_attachment_bytes));

    // 5. Create and run the server
    let server = Server::new(dispatcher, get_presence_usecase, config);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
