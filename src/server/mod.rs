//! Server layer: accept loop, per-connection sessions, and the chat
//! handlers wired into the event bus.

pub mod chat_server;
pub mod handlers;
pub mod session;

pub use chat_server::ChatServer;
