//! Axum request handlers.

mod http;
mod websocket;

pub use http::{get_presence, health_check, root};
pub use websocket::websocket_handler;
