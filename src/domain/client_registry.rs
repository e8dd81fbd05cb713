//! Set of currently connected clients.
//!
//! [`ClientRegistry`] is shared between the accept loop and every reader
//! and writer task, so the map sits behind a [`std::sync::RwLock`]. The
//! lock is never held across an `.await` or across a bus dispatch:
//! broadcasters work on a [`ClientRegistry::snapshot`].

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use super::{ClientId, Connection};

/// Registry of live connections keyed by [`ClientId`].
///
/// Insert and remove are idempotent.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: RwLock<HashMap<ClientId, Connection>>,
}

impl ClientRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `conn`. Returns `false` if it was already present.
    pub fn insert(&self, conn: Connection) -> bool {
        let mut map = self.clients.write().unwrap_or_else(PoisonError::into_inner);
        if map.contains_key(&conn.id()) {
            return false;
        }
        map.insert(conn.id(), conn);
        true
    }

    /// Removes the connection with `id`, returning it if it was present.
    pub fn remove(&self, id: ClientId) -> Option<Connection> {
        self.clients
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
    }

    /// Returns `true` if a connection with `id` is registered.
    #[must_use]
    pub fn contains(&self, id: ClientId) -> bool {
        self.clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&id)
    }

    /// Returns a copy of the current members.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Connection> {
        self.clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    /// Returns the number of registered connections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if no connection is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
