//! Domain layer: client identity, connection handles, events, the event
//! bus, and the client registry.
//!
//! Nothing in here touches sockets. The server layer owns the transport
//! and feeds this layer through [`EventBus::dispatch`].

pub mod chat_event;
pub mod client_id;
pub mod client_registry;
pub mod connection;
pub mod event_bus;

pub use chat_event::{ChatEvent, ChatMessage, EventKind};
pub use client_id::ClientId;
pub use client_registry::ClientRegistry;
pub use connection::{Connection, OutboundReceiver};
pub use event_bus::{EventBus, Handler};
