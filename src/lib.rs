//! # relay-chat
//!
//! Event-driven TCP broadcast chat server.
//!
//! Every byte chunk a client sends is relayed verbatim to every connected
//! client, the sender included. Connection lifecycle and message delivery
//! are driven by a synchronous in-process event bus.
//!
//! ## Architecture
//!
//! ```text
//! TCP clients
//!     │
//!     ├── ChatServer accept loop (server/)
//!     │       └── dispatches new-connection
//!     ├── Session per client (server/)
//!     │       ├── read loop  → message-received / disconnected
//!     │       └── write loop ← outbound queue
//!     │
//!     ├── EventBus (domain/)
//!     │       └── handlers (server/handlers)
//!     │
//!     └── ClientRegistry (domain/)
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod server;
