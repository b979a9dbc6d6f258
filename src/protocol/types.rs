//! Reply Types
//!
//! FlintKV only ever answers with three shapes, all borrowed from RESP:
//!
//! - `+` Simple String: `+OK\r\n`, `+PONG\r\n`, `+<value>\r\n`
//! - `-` Error: `-ERR unknown command 'foo'\r\n`
//! - `$-1` Null Bulk String: `$-1\r\n` (key missing or expired)
//!
//! Stored values are sent back as simple strings rather than length-prefixed
//! bulk strings, so a value containing CRLF cannot be returned intact.

use bytes::Bytes;
use std::fmt;

/// The CRLF terminator used on the wire
pub const CRLF: &[u8] = b"\r\n";

/// Type prefixes. Request lines starting with any of these are framing and get dropped.
pub mod prefix {
    pub const SIMPLE_STRING: u8 = b'+';
    pub const ERROR: u8 = b'-';
    pub const INTEGER: u8 = b':';
    pub const BULK_STRING: u8 = b'$';
    pub const ARRAY: u8 = b'*';

    /// All five markers, in the order above.
    pub const MARKERS: [u8; 5] = [SIMPLE_STRING, ERROR, INTEGER, BULK_STRING, ARRAY];

    /// Returns true if `byte` is one of the framing markers.
    #[inline]
    pub fn is_marker(byte: u8) -> bool {
        MARKERS.contains(&byte)
    }
}

/// A reply sent back to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Format: `+<text>\r\n`
    Simple(Bytes),

    /// Format: `-<message>\r\n`
    Error(String),

    /// Format: `$-1\r\n`
    Null,
}

impl Reply {
    /// Creates a simple string reply.
    ///
    /// # Example
    /// ```
    /// use flintkv::protocol::Reply;
    /// assert_eq!(Reply::simple("hello").serialize(), b"+hello\r\n");
    /// ```
    pub fn simple(s: impl Into<Bytes>) -> Self {
        Reply::Simple(s.into())
    }

    /// Creates an error reply. The message should carry its own `ERR` prefix.
    ///
    /// # Example
    /// ```
    /// use flintkv::protocol::Reply;
    /// let err = Reply::error("ERR empty command");
    /// assert_eq!(err.serialize(), b"-ERR empty command\r\n");
    /// ```
    pub fn error(s: impl Into<String>) -> Self {
        Reply::Error(s.into())
    }

    pub fn null() -> Self {
        Reply::Null
    }

    pub fn ok() -> Self {
        Reply::Simple(Bytes::from_static(b"OK"))
    }

    pub fn pong() -> Self {
        Reply::Simple(Bytes::from_static(b"PONG"))
    }

    /// `-ERR unknown command '<name>'`
    pub fn unknown_command(name: &str) -> Self {
        Reply::Error(format!("ERR unknown command '{}'", name))
    }

    /// `-ERR wrong number of arguments for '<name>' command`
    pub fn wrong_arity(name: &str) -> Self {
        Reply::Error(format!(
            "ERR wrong number of arguments for '{}' command",
            name
        ))
    }

    /// Serializes the reply to its wire format.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.serialize_into(&mut buf);
        buf
    }

    /// Serializes the reply into an existing buffer.
    pub fn serialize_into(&self, buf: &mut Vec<u8>) {
        match self {
            Reply::Simple(s) => {
                buf.push(prefix::SIMPLE_STRING);
                buf.extend_from_slice(s);
                buf.extend_from_slice(CRLF);
            }
            Reply::Error(s) => {
                buf.push(prefix::ERROR);
                buf.extend_from_slice(s.as_bytes());
                buf.extend_from_slice(CRLF);
            }
            Reply::Null => {
                buf.push(prefix::BULK_STRING);
                buf.extend_from_slice(b"-1");
                buf.extend_from_slice(CRLF);
            }
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Reply::Null)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_))
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Simple(data) => match std::str::from_utf8(data) {
                Ok(s) => write!(f, "\"{}\"", s),
                Err(_) => write!(f, "(binary data, {} bytes)", data.len()),
            },
            Reply::Error(s) => write!(f, "(error) {}", s),
            Reply::Null => write!(f, "(nil)"),
        }
    }
}
