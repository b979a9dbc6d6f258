//! Connection Module
//!
//! Manages individual client connections. Each client is served by its own
//! Tokio task, admitted through the server's bounded connection pool.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Server (accept loop)                       │
//! └──────────────────────┬──────────────────────────────────────┘
//!                        │
//!                        │ acquire permit, accept(), spawn task
//!                        ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 ConnectionHandler                           │
//! │                                                             │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐     │
//! │  │ Read chunk  │───>│   Decode    │───>│ Execute cmd │     │
//! │  └─────────────┘    └─────────────┘    └──────┬──────┘     │
//! │                                               ▼             │
//! │                                       ┌─────────────┐       │
//! │                                       │ Send reply  │       │
//! │                                       └─────────────┘       │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod handler;

pub use handler::{
    handle_connection, respond, ConnectionError, ConnectionHandler, ConnectionStats,
    READ_CHUNK_SIZE,
};
