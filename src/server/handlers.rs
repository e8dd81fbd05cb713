//! The three chat handlers and the bus they are wired into.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::{ChatEvent, ChatMessage, ClientRegistry, Connection, EventBus};

/// Builds the server's event bus with its handlers registered against
/// `registry`.
#[must_use]
pub fn build_event_bus(registry: &Arc<ClientRegistry>) -> EventBus {
    let mut bus = EventBus::new();

    let clients = Arc::clone(registry);
    bus.on_new_connection(move |conn, _| on_new_connection(&clients, conn));

    let clients = Arc::clone(registry);
    bus.on_disconnected(move |conn, _| on_disconnected(&clients, conn));

    let clients = Arc::clone(registry);
    bus.on_message_received(move |msg, bus| broadcast(&clients, msg, bus));

    bus
}

/// Adds `conn` to the registry.
pub fn on_new_connection(registry: &ClientRegistry, conn: &Connection) {
    if registry.insert(conn.clone()) {
        info!(client_id = %conn.id(), peer = %conn.peer(), "new connection");
    }
}

/// Removes `conn` from the registry. A connection that is not registered
/// is ignored.
pub fn on_disconnected(registry: &ClientRegistry, conn: &Connection) {
    if let Some(gone) = registry.remove(conn.id()) {
        let online_secs = (chrono::Utc::now() - gone.connected_at()).num_seconds();
        info!(client_id = %gone.id(), peer = %gone.peer(), online_secs, "disconnected");
    }
}

/// Queues `msg` to every registered connection, the originator included.
///
/// A connection whose writer has stopped is dispatched as `disconnected`
/// and skipped; delivery to the others continues.
pub fn broadcast(registry: &ClientRegistry, msg: &ChatMessage, bus: &EventBus) {
    debug!(origin = %msg.origin(), bytes = msg.body().len(), text = %msg.text(), "broadcast");
    for conn in registry.snapshot() {
        if conn.send(msg.shared_body()).is_err() {
            bus.dispatch(ChatEvent::Disconnected(conn));
        }
    }
}
