//! Connection handle shared between the registry and the per-client tasks.
//!
//! A [`Connection`] does not own the socket. The reader loop and the
//! writer task own the two halves of the stream; the handle only carries
//! the client's identity and the sending side of its outbound queue.

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use super::ClientId;
use crate::error::ChatError;

/// Receiving side of a connection's outbound queue, drained by the writer
/// task.
pub type OutboundReceiver = mpsc::UnboundedReceiver<Arc<[u8]>>;

/// Handle to one connected client.
///
/// Cloning is cheap. Two handles are equal when they refer to the same
/// accepted connection.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ClientId,
    peer: SocketAddr,
    connected_at: DateTime<Utc>,
    outbound: mpsc::UnboundedSender<Arc<[u8]>>,
}

impl Connection {
    /// Creates a handle for a freshly accepted peer together with the
    /// receiver its writer task must drain.
    #[must_use]
    pub fn new(peer: SocketAddr) -> (Self, OutboundReceiver) {
        let (outbound, rx) = mpsc::unbounded_channel();
        let conn = Self {
            id: ClientId::new(),
            peer,
            connected_at: Utc::now(),
            outbound,
        };
        (conn, rx)
    }

    /// Returns the connection's identifier.
    #[must_use]
    pub const fn id(&self) -> ClientId {
        self.id
    }

    /// Returns the remote endpoint.
    #[must_use]
    pub const fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Returns when the connection was accepted.
    #[must_use]
    pub const fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    /// Queues `bytes` for delivery to this client.
    ///
    /// Never blocks. Delivery to the socket happens on the writer task.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::ConnectionClosed`] if the writer task has
    /// already stopped, i.e. the socket can no longer be written.
    pub fn send(&self, bytes: Arc<[u8]>) -> Result<(), ChatError> {
        self.outbound
            .send(bytes)
            .map_err(|_| ChatError::ConnectionClosed(self.id))
    }

    /// Returns `true` once the writer task has dropped its receiver.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.outbound.is_closed()
    }
}

impl PartialEq for Connection {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Connection {}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn peer() -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 40_000))
    }

    #[test]
    fn send_queues_bytes_for_writer() {
        let (conn, mut rx) = Connection::new(peer());
        assert!(conn.send(Arc::from(b"hi".as_slice())).is_ok());

        let Ok(bytes) = rx.try_recv() else {
            panic!("expected queued bytes");
        };
        assert_eq!(&*bytes, b"hi");
    }

    #[test]
    fn send_fails_after_receiver_dropped() {
        let (conn, rx) = Connection::new(peer());
        drop(rx);

        assert!(conn.is_closed());
        let Err(ChatError::ConnectionClosed(id)) = conn.send(Arc::from(b"x".as_slice())) else {
            panic!("expected ConnectionClosed");
        };
        assert_eq!(id, conn.id());
    }

    #[test]
    fn clones_compare_equal_distinct_peers_do_not() {
        let (a, _rx_a) = Connection::new(peer());
        let (b, _rx_b) = Connection::new(peer());
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }
}
