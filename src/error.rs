//! Chat server error types.
//!
//! [`ChatError`] is the central error type of the library. Per-connection
//! failures never escape as errors: they are turned into `disconnected`
//! events. Only startup failures reach the caller of the server.

use std::net::SocketAddr;

use crate::domain::ClientId;

/// Server-side error enum.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// The listening socket could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address that was requested.
        addr: SocketAddr,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Transport-level I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The writer for this connection has stopped.
    #[error("connection {0} is closed")]
    ConnectionClosed(ClientId),

    /// A configuration value could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}
