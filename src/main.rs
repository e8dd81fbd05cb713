//! relay-chat server entry point.
//!
//! Binds the configured address and relays chat traffic until Ctrl-C.

use tracing_subscriber::EnvFilter;

use relay_chat::config::ServerConfig;
use relay_chat::server::ChatServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = ServerConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting relay-chat");

    // Bind failure is fatal
    let server = ChatServer::bind(&config).await?;
    tracing::info!(addr = %server.local_addr()?, "listening");

    server.run_until_ctrl_c().await;

    Ok(())
}
