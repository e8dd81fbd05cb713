//! Synchronous publish/subscribe bus for chat events.
//!
//! [`EventBus`] maps each [`EventKind`] to an ordered list of handlers.
//! [`EventBus::dispatch`] runs every handler for the event's kind on the
//! caller's task, in registration order, and only returns once all of
//! them have returned. Handlers are plain closures and never suspend.
//!
//! Registration takes `&mut self`: the table is filled in before the bus
//! is shared behind an `Arc`, after which it is read-only and needs no
//! lock.

use std::collections::HashMap;
use std::fmt;

use super::{ChatEvent, ChatMessage, Connection, EventKind};

/// A registered event handler.
///
/// Receives the event and the bus itself, so it can dispatch follow-up
/// events (for example `disconnected` after a failed write).
pub type Handler = Box<dyn Fn(&ChatEvent, &EventBus) + Send + Sync>;

/// Handler table keyed by [`EventKind`].
#[derive(Default)]
pub struct EventBus {
    handlers: HashMap<EventKind, Vec<Handler>>,
}

impl EventBus {
    /// Creates a bus with no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `handler` to the list for `kind`.
    ///
    /// Handlers for the same kind run in the order they were registered.
    pub fn register<F>(&mut self, kind: EventKind, handler: F)
    where
        F: Fn(&ChatEvent, &EventBus) + Send + Sync + 'static,
    {
        self.handlers.entry(kind).or_default().push(Box::new(handler));
    }

    /// Registers a handler that receives the connection of every
    /// `new-connection` event.
    pub fn on_new_connection<F>(&mut self, handler: F)
    where
        F: Fn(&Connection, &EventBus) + Send + Sync + 'static,
    {
        self.register(EventKind::NewConnection, move |event, bus| {
            if let ChatEvent::NewConnection(conn) = event {
                handler(conn, bus);
            }
        });
    }

    /// Registers a handler that receives the connection of every
    /// `disconnected` event.
    pub fn on_disconnected<F>(&mut self, handler: F)
    where
        F: Fn(&Connection, &EventBus) + Send + Sync + 'static,
    {
        self.register(EventKind::Disconnected, move |event, bus| {
            if let ChatEvent::Disconnected(conn) = event {
                handler(conn, bus);
            }
        });
    }

    /// Registers a handler that receives the message of every
    /// `message-received` event.
    pub fn on_message_received<F>(&mut self, handler: F)
    where
        F: Fn(&ChatMessage, &EventBus) + Send + Sync + 'static,
    {
        self.register(EventKind::MessageReceived, move |event, bus| {
            if let ChatEvent::MessageReceived(msg) = event {
                handler(msg, bus);
            }
        });
    }

    /// Invokes every handler registered for the event's kind.
    ///
    /// A kind with no handlers is a silent no-op.
    pub fn dispatch(&self, event: ChatEvent) {
        let Some(handlers) = self.handlers.get(&event.kind()) else {
            return;
        };
        for handler in handlers {
            handler(&event, self);
        }
    }

    /// Returns the number of handlers registered for `kind`.
    #[must_use]
    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (kind, handlers) in &self.handlers {
            map.entry(&kind.as_str(), &handlers.len());
        }
        map.finish()
    }
}
