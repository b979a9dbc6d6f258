//! Connection Handler
//!
//! Each client connection runs its own task: read a chunk, decode it, run the
//! command, write exactly one reply, repeat until the peer goes away.
//!
//! ## Connection Lifecycle
//!
//! ```text
//! 1. Client connects (TCP handshake)
//!        │
//!        ▼
//! 2. ConnectionHandler spawned (holding a pool permit)
//!        │
//!        ▼
//! 3. ┌──────────────────────────────┐
//!    │  Read up to 1024 bytes       │
//!    │  Decode chunk → Command      │
//!    │  Execute → Reply             │
//!    │  Write reply                 │
//!    │         [Loop back]          │
//!    └──────────────────────────────┘
//!        │
//!        ▼
//! 4. EOF or I/O error: task ends, permit released
//! ```
//!
//! ## One Chunk, One Command
//!
//! Every successful read is decoded on its own. Nothing is carried over between
//! reads, so a command larger than one read, or split by the network, is decoded
//! as garbage, and two commands arriving in one read are decoded as one.

use crate::commands::CommandHandler;
use crate::protocol::{decode_with, DecodeError, DecodeOptions, Reply};
use bytes::{BufMut, BytesMut};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;
use tracing::{debug, info, trace, warn};

/// Maximum number of bytes taken from the socket per read
pub const READ_CHUNK_SIZE: usize = 1024;

/// Statistics for connection handling
#[derive(Debug, Default)]
pub struct ConnectionStats {
    /// Total number of connections accepted
    pub connections_accepted: AtomicU64,
    /// Currently active connections
    pub active_connections: AtomicU64,
    /// Total commands processed, unknown ones included
    pub commands_processed: AtomicU64,
    /// Chunks that could not be decoded into a command
    pub protocol_errors: AtomicU64,
    pub bytes_read: AtomicU64,
    pub bytes_written: AtomicU64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn command_processed(&self) {
        self.commands_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn protocol_error(&self) {
        self.protocol_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_read(&self, count: usize) {
        self.bytes_read.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn bytes_written(&self, count: usize) {
        self.bytes_written.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn active(&self) -> u64 {
        self.active_connections.load(Ordering::Relaxed)
    }
}

/// Handles a single client connection.
///
/// Generic over the byte stream so it can be driven by something other than a
/// socket; the server always uses `TcpStream`.
pub struct ConnectionHandler<S = TcpStream> {
    stream: BufWriter<S>,

    /// Client's address (for logging)
    addr: SocketAddr,

    /// Holds the current chunk only
    buffer: BytesMut,

    command_handler: CommandHandler,

    decode_options: DecodeOptions,

    stats: Arc<ConnectionStats>,
}

impl<S> ConnectionHandler<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(
        stream: S,
        addr: SocketAddr,
        command_handler: CommandHandler,
        decode_options: DecodeOptions,
        stats: Arc<ConnectionStats>,
    ) -> Self {
        stats.connection_opened();

        Self {
            stream: BufWriter::new(stream),
            addr,
            buffer: BytesMut::with_capacity(READ_CHUNK_SIZE),
            command_handler,
            decode_options,
            stats,
        }
    }

    /// Runs the read-decode-execute-reply loop until the client disconnects
    /// or an I/O error occurs.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        info!(client = %self.addr, "Client connected");

        let result = self.main_loop().await;

        match &result {
            Ok(()) => info!(client = %self.addr, "Client disconnected"),
            Err(ConnectionError::ClientDisconnected) => {
                info!(client = %self.addr, "Client disconnected")
            }
            Err(ConnectionError::Io(io_err))
                if io_err.kind() == std::io::ErrorKind::ConnectionReset =>
            {
                debug!(client = %self.addr, "Connection reset by client")
            }
            Err(e) => warn!(client = %self.addr, error = %e, "Connection error"),
        }

        self.stats.connection_closed();
        result
    }

    async fn main_loop(&mut self) -> Result<(), ConnectionError> {
        loop {
            self.read_chunk().await?;

            let reply = respond(
                &self.command_handler,
                self.decode_options,
                &self.buffer,
                &self.stats,
            );

            self.send_reply(&reply).await?;
        }
    }

    /// Replaces the buffer contents with the next chunk from the socket.
    async fn read_chunk(&mut self) -> Result<(), ConnectionError> {
        self.buffer.clear();

        let mut chunk = (&mut self.buffer).limit(READ_CHUNK_SIZE);
        let n = self.stream.get_mut().read_buf(&mut chunk).await?;

        if n == 0 {
            return Err(ConnectionError::ClientDisconnected);
        }

        self.stats.bytes_read(n);
        trace!(
            client = %self.addr,
            bytes = n,
            data = %String::from_utf8_lossy(&self.buffer).escape_debug(),
            "Received data"
        );

        Ok(())
    }

    async fn send_reply(&mut self, reply: &Reply) -> Result<(), ConnectionError> {
        let bytes = reply.serialize();
        self.stream.write_all(&bytes).await?;
        self.stream.flush().await?;
        self.stats.bytes_written(bytes.len());
        trace!(client = %self.addr, reply = %reply, "Sent reply");
        Ok(())
    }
}

/// Produces the reply for one raw chunk.
///
/// Undecodable chunks get an error reply; they never end the connection.
pub fn respond(
    command_handler: &CommandHandler,
    decode_options: DecodeOptions,
    chunk: &[u8],
    stats: &ConnectionStats,
) -> Reply {
    match decode_with(chunk, decode_options) {
        Ok(command) => {
            stats.command_processed();
            debug!(command = %command.name, args = command.args.len(), "Executing command");
            command_handler.execute(&command)
        }
        Err(e) => {
            stats.protocol_error();
            debug!(error = %e, "Rejected request");
            match e {
                DecodeError::Empty => Reply::error("ERR empty command"),
                DecodeError::InvalidUtf8(_) => Reply::error("ERR invalid UTF-8 in request"),
            }
        }
    }
}

/// Errors that end a connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Client closed its side of the connection
    #[error("Client disconnected")]
    ClientDisconnected,
}

/// Creates a ConnectionHandler and runs it to completion.
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    command_handler: CommandHandler,
    decode_options: DecodeOptions,
    stats: Arc<ConnectionStats>,
) {
    let handler = ConnectionHandler::new(stream, addr, command_handler, decode_options, stats);
    // Outcome is already logged by run()
    let _ = handler.run().await;
}
