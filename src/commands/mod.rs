//! Command Module
//!
//! Receives decoded commands, runs them against the store and builds the reply.
//!
//! ```text
//! Client Request
//!       │
//!       ▼
//! ┌─────────────────┐
//! │    Decoder      │  (protocol module)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ CommandHandler  │  (this module)
//! │                 │
//! │  - Lookup       │
//! │  - Arity check  │
//! │  - Execute      │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │     Store       │  (storage module)
//! └─────────────────┘
//! ```

pub mod handler;

pub use handler::{lookup, Arity, CommandHandler, CommandSpec, Handler, COMMAND_TABLE};
