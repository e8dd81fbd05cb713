//! End-to-end tests driving real TCP clients against a running server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use relay_chat::config::ServerConfig;
use relay_chat::domain::{ClientRegistry, EventKind};
use relay_chat::server::ChatServer;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};

const WAIT: Duration = Duration::from_secs(2);

struct Running {
    addr: SocketAddr,
    registry: Arc<ClientRegistry>,
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

async fn start(read_chunk_size: usize) -> Result<Running> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let server = ChatServer::new(listener, read_chunk_size);
    let addr = server.local_addr()?;
    let registry = server.registry();

    let (stop, stop_rx) = oneshot::channel::<()>();
    let task = tokio::spawn(server.run_until(async move {
        let _ = stop_rx.await;
    }));

    Ok(Running {
        addr,
        registry,
        stop,
        task,
    })
}

async fn wait_for_clients(registry: &ClientRegistry, expected: usize) -> Result<()> {
    let polled = timeout(WAIT, async {
        while registry.len() != expected {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    if polled.is_err() {
        bail!("expected {expected} clients, registry has {}", registry.len());
    }
    Ok(())
}

async fn join(running: &Running) -> Result<TcpStream> {
    let before = running.registry.len();
    let stream = TcpStream::connect(running.addr).await?;
    wait_for_clients(&running.registry, before + 1).await?;
    Ok(stream)
}

async fn expect_bytes(stream: &mut TcpStream, expected: &[u8]) -> Result<()> {
    let mut buf = vec![0_u8; expected.len()];
    timeout(WAIT, stream.read_exact(&mut buf)).await??;
    assert_eq!(buf, expected);
    Ok(())
}

#[tokio::test]
async fn message_reaches_everyone_and_departed_clients_are_dropped() -> Result<()> {
    let running = start(1024).await?;

    let mut alice = join(&running).await?;
    let mut bob = join(&running).await?;
    let mut carol = join(&running).await?;

    alice.write_all(b"hello").await?;

    expect_bytes(&mut bob, b"hello").await?;
    expect_bytes(&mut carol, b"hello").await?;
    // The sender is not excluded from the broadcast.
    expect_bytes(&mut alice, b"hello").await?;

    drop(bob);
    wait_for_clients(&running.registry, 2).await?;

    alice.write_all(b"again").await?;
    expect_bytes(&mut carol, b"again").await?;
    expect_bytes(&mut alice, b"again").await?;

    let _ = running.stop.send(());
    let _ = running.task.await;
    Ok(())
}

#[tokio::test]
async fn long_message_arrives_intact_across_chunks() -> Result<()> {
    let running = start(4).await?;

    let mut sender = join(&running).await?;
    let mut listener = join(&running).await?;

    let payload = b"a message much longer than one chunk";
    sender.write_all(payload).await?;
    expect_bytes(&mut listener, payload).await?;

    let _ = running.stop.send(());
    let _ = running.task.await;
    Ok(())
}

#[tokio::test]
async fn shutdown_disconnects_every_client() -> Result<()> {
    let running = start(1024).await?;

    let mut first = join(&running).await?;
    let mut second = join(&running).await?;

    let _ = running.stop.send(());
    let _ = running.task.await;

    wait_for_clients(&running.registry, 0).await?;

    let mut buf = [0_u8; 8];
    let n = timeout(WAIT, first.read(&mut buf)).await??;
    assert_eq!(n, 0);
    let n = timeout(WAIT, second.read(&mut buf)).await??;
    assert_eq!(n, 0);
    Ok(())
}

#[tokio::test]
async fn oversized_chunk_size_still_relays_and_deregisters() -> Result<()> {
    let running = start(usize::MAX).await?;

    let mut sender = join(&running).await?;
    let mut listener = join(&running).await?;

    sender.write_all(b"still works").await?;
    expect_bytes(&mut listener, b"still works").await?;

    drop(sender);
    wait_for_clients(&running.registry, 1).await?;

    let _ = running.stop.send(());
    let _ = running.task.await;
    Ok(())
}

#[tokio::test]
async fn bound_server_wires_one_handler_per_event_kind() -> Result<()> {
    let config = ServerConfig {
        listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        ..ServerConfig::default()
    };
    let server = ChatServer::bind(&config).await?;
    assert_ne!(server.local_addr()?.port(), 0);

    let bus = server.event_bus();
    assert_eq!(bus.handler_count(EventKind::NewConnection), 1);
    assert_eq!(bus.handler_count(EventKind::Disconnected), 1);
    assert_eq!(bus.handler_count(EventKind::MessageReceived), 1);
    Ok(())
}
