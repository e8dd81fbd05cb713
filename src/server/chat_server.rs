//! TCP accept loop.
//!
//! [`ChatServer`] owns the listener, the [`EventBus`], and the
//! [`ClientRegistry`]. Every accepted stream becomes a [`Connection`],
//! is announced with a `new-connection` event, and gets its own session
//! task.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tracing::{info, warn};

use super::handlers::build_event_bus;
use super::session::run_session;
use crate::config::{ServerConfig, clamp_read_chunk_size};
use crate::domain::{ChatEvent, ClientRegistry, Connection, EventBus};
use crate::error::ChatError;

/// Broadcast chat server.
#[derive(Debug)]
pub struct ChatServer {
    listener: TcpListener,
    bus: Arc<EventBus>,
    registry: Arc<ClientRegistry>,
    read_chunk_size: usize,
}

impl ChatServer {
    /// Binds `config.listen_addr` and builds a server on it.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Bind`] if the address cannot be bound.
    pub async fn bind(config: &ServerConfig) -> Result<Self, ChatError> {
        let addr = config.listen_addr;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ChatError::Bind { addr, source })?;
        Ok(Self::new(listener, config.read_chunk_size))
    }

    /// Builds a server on an already bound listener.
    ///
    /// `read_chunk_size` is clamped with [`clamp_read_chunk_size`].
    #[must_use]
    pub fn new(listener: TcpListener, read_chunk_size: usize) -> Self {
        let registry = Arc::new(ClientRegistry::new());
        let bus = Arc::new(build_event_bus(&registry));
        Self {
            listener,
            bus,
            registry,
            read_chunk_size: clamp_read_chunk_size(read_chunk_size),
        }
    }

    /// Returns the address the listener is bound to.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Io`] if the socket address cannot be read.
    pub fn local_addr(&self) -> Result<SocketAddr, ChatError> {
        Ok(self.listener.local_addr()?)
    }

    /// Returns a handle to the client registry.
    #[must_use]
    pub fn registry(&self) -> Arc<ClientRegistry> {
        Arc::clone(&self.registry)
    }

    /// Returns a handle to the event bus.
    #[must_use]
    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.bus)
    }

    /// Accepts connections until `shutdown` resolves, then signals every
    /// session to stop.
    ///
    /// Accept failures are logged and the loop keeps going.
    pub async fn run_until<F>(self, shutdown: F)
    where
        F: Future<Output = ()> + Send,
    {
        let Self {
            listener,
            bus,
            registry,
            read_chunk_size,
        } = self;
        let (stop_tx, stop_rx) = watch::channel(false);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        accept_client(stream, peer, &bus, read_chunk_size, stop_rx.clone());
                    }
                    Err(err) => warn!(error = %err, "failed to accept connection"),
                },
            }
        }

        info!(clients = registry.len(), "chat server shutting down");
        let _ = stop_tx.send(true);
    }

    /// Runs until Ctrl-C is received.
    pub async fn run_until_ctrl_c(self) {
        self.run_until(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = %err, "failed to install ctrl-c handler");
            }
        })
        .await;
    }
}

fn accept_client(
    stream: TcpStream,
    peer: SocketAddr,
    bus: &Arc<EventBus>,
    read_chunk_size: usize,
    stop: watch::Receiver<bool>,
) {
    let (conn, outbound) = Connection::new(peer);
    bus.dispatch(ChatEvent::NewConnection(conn.clone()));
    tokio::spawn(run_session(
        stream,
        conn,
        outbound,
        Arc::clone(bus),
        read_chunk_size,
        stop,
    ));
}
