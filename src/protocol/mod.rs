//! Wire Protocol
//!
//! FlintKV speaks a simplified, line-oriented subset of the Redis Serialization
//! Protocol (RESP). Requests may be sent as RESP arrays or as bare lines; either way
//! the type-prefixed lines are discarded and only the payload lines are kept.
//!
//! ## Modules
//!
//! - `types`: The `Reply` enum and its serialization
//! - `decoder`: Turns a raw chunk into a `Command`
//!
//! ## Example
//!
//! ```
//! use flintkv::protocol::{decode, Reply};
//!
//! let cmd = decode(b"*3\r\n$3\r\nSET\r\n$4\r\nuser\r\n$5\r\nalice\r\n").unwrap();
//! assert_eq!(cmd.name, "set");
//! assert_eq!(cmd.args, vec!["user".to_string(), "alice".to_string()]);
//!
//! assert_eq!(Reply::ok().serialize(), b"+OK\r\n");
//! ```

pub mod decoder;
pub mod types;

pub use decoder::{decode, decode_with, Command, DecodeError, DecodeOptions, DecodeResult};
pub use types::Reply;
