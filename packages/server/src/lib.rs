//! Real-time presence and message-fanout server.
//!
//! Clients connect over WebSocket, announce a display name, and exchange
//! broadcast, room-scoped and direct messages with handoff acknowledgments,
//! typing indicators and file attachments.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
