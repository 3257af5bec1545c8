//! WebSocket / HTTP surface of the server.

mod dispatcher;
mod handler;
mod server;
mod signal;
pub mod state;

pub use dispatcher::{DispatcherUseCases, EventDispatcher};
pub use server::Server;
