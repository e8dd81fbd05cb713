//! Chat events published on the [`super::EventBus`].
//!
//! Each event kind carries its own strongly typed payload, so a handler
//! registered for a kind can never be handed a payload of another shape.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use super::{ClientId, Connection};

/// Discriminant of a [`ChatEvent`], used as the handler-table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A connection was accepted.
    NewConnection,
    /// A connection failed to read or write and is gone.
    Disconnected,
    /// A chunk of bytes arrived from some client.
    MessageReceived,
}

impl EventKind {
    /// Returns the kind's stable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NewConnection => "new-connection",
            Self::Disconnected => "disconnected",
            Self::MessageReceived => "message-received",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bytes received by one read call on one connection.
///
/// The body is relayed verbatim; it is not required to be UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    origin: ClientId,
    body: Arc<[u8]>,
}

impl ChatMessage {
    /// Creates a message from `origin` carrying `body`.
    #[must_use]
    pub fn new(origin: ClientId, body: &[u8]) -> Self {
        Self {
            origin,
            body: Arc::from(body),
        }
    }

    /// Returns the client the bytes were read from.
    #[must_use]
    pub const fn origin(&self) -> ClientId {
        self.origin
    }

    /// Returns the raw bytes.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns a shared handle to the body, suitable for queueing to many
    /// connections without copying.
    #[must_use]
    pub fn shared_body(&self) -> Arc<[u8]> {
        Arc::clone(&self.body)
    }

    /// Returns the body as text, replacing invalid UTF-8 sequences.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// An event flowing through the bus.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// Payload: the freshly accepted connection.
    NewConnection(Connection),
    /// Payload: the connection that went away.
    Disconnected(Connection),
    /// Payload: the bytes read.
    MessageReceived(ChatMessage),
}

impl ChatEvent {
    /// Returns the event's kind.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::NewConnection(_) => EventKind::NewConnection,
            Self::Disconnected(_) => EventKind::Disconnected,
            Self::MessageReceived(_) => EventKind::MessageReceived,
        }
    }
}
