//! Line-Oriented Command Decoder
//!
//! Turns one raw chunk read from a socket into a command name and its arguments.
//!
//! ## How It Works
//!
//! 1. Split the chunk on CRLF into lines.
//! 2. Drop empty lines and lines starting with a framing marker (`+ - : $ *`).
//! 3. The first surviving line is the command name, the rest are arguments.
//!
//! So both of these decode to `("echo", ["hey"])`:
//!
//! ```text
//! *2\r\n$4\r\nECHO\r\n$3\r\nhey\r\n
//! ECHO\r\nhey\r\n
//! ```
//!
//! ## Limitations
//!
//! This is not a length-prefixed parser. The `$<len>` and `*<count>` lines are
//! thrown away rather than honored, which means:
//!
//! - a value containing CRLF is split into several arguments
//! - an argument that itself starts with a marker (e.g. `-5`) is dropped
//! - a command split across two reads is decoded as two broken commands
//!
//! Each chunk is one command. Callers must not pipeline.

use crate::protocol::types::prefix;
use thiserror::Error;

/// Errors that can occur while decoding a chunk.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The chunk held nothing but framing markers and blank lines
    #[error("no command found in request")]
    Empty,

    /// The chunk is not valid UTF-8
    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(String),
}

/// Result type for decoding operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// A decoded command: lowercase name plus ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub args: Vec<String>,
}

impl Command {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// Knobs for the decoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Lowercase the arguments too, not only the command name.
    ///
    /// Off by default so `ECHO Hello` answers `+Hello`. Turning it on makes keys
    /// case-insensitive (`SET Foo 1` then `GET foo` hits) and ECHO case-folded.
    pub fold_arguments: bool,
}

/// Decodes a raw chunk with default options.
///
/// # Example
///
/// ```
/// use flintkv::protocol::decode;
///
/// let cmd = decode(b"*2\r\n$4\r\nECHO\r\n$5\r\nHello\r\n").unwrap();
/// assert_eq!(cmd.name, "echo");
/// assert_eq!(cmd.args, vec!["Hello".to_string()]);
/// ```
pub fn decode(raw: &[u8]) -> DecodeResult<Command> {
    decode_with(raw, DecodeOptions::default())
}

/// Decodes a raw chunk.
pub fn decode_with(raw: &[u8], options: DecodeOptions) -> DecodeResult<Command> {
    let text = std::str::from_utf8(raw).map_err(|e| DecodeError::InvalidUtf8(e.to_string()))?;

    let mut tokens = text.split("\r\n").filter(|line| is_token(line));

    let name = tokens.next().ok_or(DecodeError::Empty)?.to_lowercase();

    let args = tokens
        .map(|arg| {
            if options.fold_arguments {
                arg.to_lowercase()
            } else {
                arg.to_string()
            }
        })
        .collect();

    Ok(Command { name, args })
}

/// A line survives if it is non-empty and does not start with a framing marker.
#[inline]
fn is_token(line: &str) -> bool {
    match line.as_bytes().first() {
        Some(&b) => !prefix::is_marker(b),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_decode_ping() {
        let cmd = decode(b"*1\r\n$4\r\nPING\r\n").unwrap();
        assert_eq!(cmd, Command::new("ping", vec![]));
    }

    #[test]
    fn test_decode_set_with_ttl() {
        let cmd = decode(b"*4\r\n$3\r\nSET\r\n$3\r\nkey\r\n$5\r\nvalue\r\n$3\r\n100\r\n").unwrap();
        assert_eq!(cmd.name, "set");
        assert_eq!(cmd.args, args(&["key", "value", "100"]));
    }

    #[test]
    fn test_decode_inline() {
        let cmd = decode(b"GET\r\nname\r\n").unwrap();
        assert_eq!(cmd, Command::new("get", args(&["name"])));
    }

    #[test]
    fn test_decode_without_trailing_crlf() {
        let cmd = decode(b"PING").unwrap();
        assert_eq!(cmd.name, "ping");
        assert!(cmd.args.is_empty());
    }

    #[test]
    fn test_arguments_keep_case_by_default() {
        let cmd = decode(b"*2\r\n$4\r\nEcHo\r\n$11\r\nHello World\r\n").unwrap();
        assert_eq!(cmd.name, "echo");
        assert_eq!(cmd.args, args(&["Hello World"]));
    }

    #[test]
    fn test_fold_arguments() {
        let options = DecodeOptions {
            fold_arguments: true,
        };
        let cmd = decode_with(b"*3\r\n$3\r\nSET\r\n$3\r\nKEY\r\n$3\r\nVaL\r\n", options).unwrap();
        assert_eq!(cmd, Command::new("set", args(&["key", "val"])));
    }

    #[test]
    fn test_every_marker_line_is_dropped() {
        let cmd = decode(b"+a\r\n-b\r\n:1\r\n$1\r\n*1\r\nget\r\nk\r\n").unwrap();
        assert_eq!(cmd, Command::new("get", args(&["k"])));
    }

    #[test]
    fn test_only_markers_is_empty() {
        assert_eq!(decode(b"*1\r\n$0\r\n\r\n"), Err(DecodeError::Empty));
        assert_eq!(decode(b"\r\n\r\n"), Err(DecodeError::Empty));
        assert_eq!(decode(b""), Err(DecodeError::Empty));
    }

    #[test]
    fn test_argument_starting_with_marker_is_lost() {
        // Known limitation: "-5" looks like an error line
        let cmd = decode(b"*2\r\n$4\r\nECHO\r\n$2\r\n-5\r\n").unwrap();
        assert_eq!(cmd, Command::new("echo", vec![]));
    }

    #[test]
    fn test_invalid_utf8() {
        let result = decode(b"GET\r\n\xff\xfe\r\n");
        assert!(matches!(result, Err(DecodeError::InvalidUtf8(_))));
    }
}
