//! TCP server: binds the listener and runs the accept loop.
//!
//! Connections are admitted through a semaphore with `max_connections` permits.
//! When every permit is taken the loop stops accepting, and new clients wait in the
//! kernel backlog until an existing client disconnects.

use crate::commands::CommandHandler;
use crate::config::Config;
use crate::connection::{handle_connection, ConnectionStats};
use crate::protocol::DecodeOptions;
use crate::storage::Store;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

/// Errors that stop the server. All of them are fatal.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to accept connection: {0}")]
    Accept(#[source] std::io::Error),
}

/// Server instance
pub struct Server {
    listener: TcpListener,
    storage: Arc<Store>,
    stats: Arc<ConnectionStats>,
    connection_limit: Arc<Semaphore>,
    max_connections: usize,
    decode_options: DecodeOptions,
}

impl Server {
    /// Binds the listener described by `config` with a fresh, empty store.
    pub async fn bind(config: &Config) -> Result<Self, ServerError> {
        let addr = config.bind_address();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        // A zero-sized pool would never admit anyone
        let max_connections = config.max_connections.max(1);

        Ok(Self {
            listener,
            storage: Arc::new(Store::new()),
            stats: Arc::new(ConnectionStats::new()),
            connection_limit: Arc::new(Semaphore::new(max_connections)),
            max_connections,
            decode_options: config.decode_options(),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn storage(&self) -> &Arc<Store> {
        &self.storage
    }

    pub fn stats(&self) -> &Arc<ConnectionStats> {
        &self.stats
    }

    /// Size of the connection pool after clamping to at least one permit.
    pub fn max_connections(&self) -> usize {
        self.max_connections
    }

    /// Accepts connections until accepting fails.
    ///
    /// Each connection gets its own task holding one pool permit for its lifetime.
    /// An accept error is returned rather than retried.
    pub async fn run(&self) -> Result<(), ServerError> {
        if let Ok(addr) = self.local_addr() {
            info!(address = %addr, max_connections = self.max_connections, "Server listening");
        }

        loop {
            if self.connection_limit.available_permits() == 0 {
                warn!(
                    max_connections = self.max_connections,
                    "Connection limit reached, waiting for a client to disconnect"
                );
            }

            // The semaphore is owned by the server and never closed
            let permit = Arc::clone(&self.connection_limit)
                .acquire_owned()
                .await
                .expect("connection semaphore closed");

            let (stream, addr) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                    return Err(ServerError::Accept(e));
                }
            };

            debug!(
                peer = %addr,
                active = self.stats.active() + 1,
                "New connection"
            );

            let handler = CommandHandler::new(Arc::clone(&self.storage));
            let stats = Arc::clone(&self.stats);
            let decode_options = self.decode_options;

            tokio::spawn(async move {
                handle_connection(stream, addr, handler, decode_options, stats).await;
                drop(permit);
            });
        }
    }
}
