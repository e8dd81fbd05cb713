//! Server configuration loaded from environment variables.
//!
//! All settings come from environment variables (or a `.env` file via
//! `dotenvy`):
//!
//! | Variable          | Default        |
//! |-------------------|----------------|
//! | `LISTEN_ADDR`     | `0.0.0.0:8000` |
//! | `READ_CHUNK_SIZE` | `1024`         |
//!
//! `READ_CHUNK_SIZE` is clamped to [`MAX_READ_CHUNK_SIZE`]; zero falls
//! back to the default.

use std::net::SocketAddr;

use crate::error::ChatError;

/// Default listen address: all interfaces, port 8000.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8000";

/// Default size of one read, in bytes.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 1024;

/// Largest accepted read size, in bytes (64 KiB).
pub const MAX_READ_CHUNK_SIZE: usize = 64 * 1024;

/// Top-level server configuration.
///
/// Loaded once at startup via [`ServerConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address to bind the chat listener to.
    pub listen_addr: SocketAddr,

    /// Maximum bytes per read. Larger messages are relayed as several
    /// independent chunks.
    pub read_chunk_size: usize,
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Config`] if `LISTEN_ADDR` is set but cannot be
    /// parsed as a [`SocketAddr`].
    pub fn from_env() -> Result<Self, ChatError> {
        dotenvy::dotenv().ok();

        let raw_addr =
            std::env::var("LISTEN_ADDR").unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = parse_listen_addr(&raw_addr)?;

        let read_chunk_size =
            clamp_read_chunk_size(parse_env("READ_CHUNK_SIZE", DEFAULT_READ_CHUNK_SIZE));

        Ok(Self {
            listen_addr,
            read_chunk_size,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
        }
    }
}

/// Maps a requested read size onto `1..=MAX_READ_CHUNK_SIZE`. Zero means
/// "unset" and yields [`DEFAULT_READ_CHUNK_SIZE`].
#[must_use]
pub const fn clamp_read_chunk_size(requested: usize) -> usize {
    match requested {
        0 => DEFAULT_READ_CHUNK_SIZE,
        n if n > MAX_READ_CHUNK_SIZE => MAX_READ_CHUNK_SIZE,
        n => n,
    }
}

fn parse_listen_addr(raw: &str) -> Result<SocketAddr, ChatError> {
    raw.parse()
        .map_err(|err| ChatError::Config(format!("LISTEN_ADDR {raw:?}: {err}")))
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
