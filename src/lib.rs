//! # FlintKV - A Small In-Memory Key-Value Cache
//!
//! FlintKV is a single-node cache reachable over TCP. It understands a simplified,
//! line-oriented subset of the Redis protocol and serves four commands:
//! `PING`, `ECHO`, `GET` and `SET` (with an optional millisecond TTL).
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              FlintKV                                    │
//! │                                                                         │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐                  │
//! │  │   Server    │───>│ Connection  │───>│  Command    │                  │
//! │  │ (bounded)   │    │  Handler    │    │  Handler    │                  │
//! │  └─────────────┘    └──────┬──────┘    └──────┬──────┘                  │
//! │                            │                  │                         │
//! │                            ▼                  ▼                         │
//! │                     ┌─────────────┐    ┌──────────────────────────────┐ │
//! │                     │  Decoder    │    │            Store             │ │
//! │                     │ (per chunk) │    │  64 RwLock shards, lazy TTL  │ │
//! │                     └─────────────┘    └──────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use flintkv::{Config, Server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let server = Server::bind(&Config::default()).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Wire Format
//!
//! | Request            | Reply                               |
//! |--------------------|-------------------------------------|
//! | `PING`             | `+PONG\r\n`                         |
//! | `ECHO text`        | `+text\r\n`                         |
//! | `GET key` (hit)    | `+value\r\n`                        |
//! | `GET key` (miss)   | `$-1\r\n`                           |
//! | `SET key value ..` | `+OK\r\n`                           |
//! | anything else      | `-ERR unknown command 'name'\r\n`   |
//!
//! ## Module Overview
//!
//! - [`protocol`]: Chunk decoder and reply types
//! - [`storage`]: Sharded store with lazy expiry
//! - [`commands`]: Command table and handlers
//! - [`connection`]: Per-client read/execute/reply loop
//! - [`server`]: Listener and bounded connection pool
//! - [`config`]: Command-line configuration

pub mod commands;
pub mod config;
pub mod connection;
pub mod protocol;
pub mod server;
pub mod storage;

pub use commands::CommandHandler;
pub use config::Config;
pub use connection::{handle_connection, ConnectionStats};
pub use protocol::{decode, Command, DecodeError, Reply};
pub use server::{Server, ServerError};
pub use storage::Store;

/// The default port FlintKV listens on (same as Redis)
pub const DEFAULT_PORT: u16 = 6379;

/// The default host FlintKV binds to (all interfaces)
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default size of the connection pool
pub const DEFAULT_MAX_CONNECTIONS: usize = 1024;

/// Version of FlintKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
