//! Per-connection session: the read loop and the write loop.
//!
//! A session runs both halves of one client's stream on a single task.
//! The read loop turns inbound chunks into `message-received` events; the
//! write loop drains the connection's outbound queue onto the socket.
//! Whichever half stops first ends the session, and the session then
//! dispatches exactly one `disconnected` event.

use std::io;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tracing::debug;

use crate::config::clamp_read_chunk_size;
use crate::domain::{ChatEvent, ChatMessage, Connection, EventBus, OutboundReceiver};

/// Why a read loop stopped.
#[derive(Debug)]
pub enum ReadEnd {
    /// The peer closed its side of the stream.
    Eof,
    /// A read failed.
    Error(io::Error),
    /// The server is shutting down.
    Shutdown,
}

/// Runs the session for an accepted TCP stream until the client goes away
/// or the server shuts down.
pub async fn run_session(
    stream: TcpStream,
    conn: Connection,
    outbound: OutboundReceiver,
    bus: Arc<EventBus>,
    read_chunk_size: usize,
    shutdown: watch::Receiver<bool>,
) {
    let (reader, writer) = stream.into_split();

    tokio::select! {
        end = read_loop(reader, &conn, &bus, read_chunk_size, shutdown) => {
            debug!(client_id = %conn.id(), peer = %conn.peer(), reason = ?end, "read loop ended");
        }
        result = write_loop(writer, outbound) => {
            if let Err(err) = result {
                debug!(client_id = %conn.id(), peer = %conn.peer(), error = %err, "write failed");
            }
        }
    }

    bus.dispatch(ChatEvent::Disconnected(conn));
}

/// Reads chunks of at most `chunk_size` bytes and dispatches each one as a
/// `message-received` event until end of stream, a read error, or the
/// shutdown signal.
///
/// Chunks are not reassembled: a message longer than `chunk_size`, or one
/// split by the transport, yields several events. `chunk_size` is clamped
/// with [`clamp_read_chunk_size`].
pub async fn read_loop<R>(
    mut reader: R,
    conn: &Connection,
    bus: &EventBus,
    chunk_size: usize,
    mut shutdown: watch::Receiver<bool>,
) -> ReadEnd
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0_u8; clamp_read_chunk_size(chunk_size)];

    loop {
        if *shutdown.borrow() {
            return ReadEnd::Shutdown;
        }

        let read = tokio::select! {
            result = reader.read(&mut buf) => result,
            _ = shutdown.changed() => return ReadEnd::Shutdown,
        };

        match read {
            Ok(0) => return ReadEnd::Eof,
            Ok(n) => {
                let Some(chunk) = buf.get(..n) else {
                    return ReadEnd::Eof;
                };
                bus.dispatch(ChatEvent::MessageReceived(ChatMessage::new(
                    conn.id(),
                    chunk,
                )));
            }
            Err(err) => return ReadEnd::Error(err),
        }
    }
}

/// Writes every queued chunk to `writer` in order.
///
/// Returns `Ok(())` once the queue is closed and drained.
///
/// # Errors
///
/// Returns the first write error; remaining queued chunks are discarded.
pub async fn write_loop<W>(mut writer: W, mut outbound: OutboundReceiver) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(bytes) = outbound.recv().await {
        writer.write_all(&bytes).await?;
    }
    writer.flush().await
}
