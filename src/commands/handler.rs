//! Command Dispatch
//!
//! Maps a lowercase command name to its handler through a fixed table, checks the
//! argument count, and runs the handler against the store.
//!
//! ## Supported Commands
//!
//! - `PING [anything ...]` - Always `+PONG`
//! - `ECHO message` - Replies with `message`
//! - `GET key` - The value, or `$-1` if missing or expired
//! - `SET key value [milliseconds]` - Always `+OK`
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CommandHandler                          │
//! │                                                             │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐     │
//! │  │  lookup()   │───>│ arity check │───>│  cmd_xxx()  │     │
//! │  └─────────────┘    └─────────────┘    └─────────────┘     │
//! │                                               │             │
//! │                                               ▼             │
//! │                                             Store           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use crate::protocol::{Command, Reply};
use crate::storage::Store;
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;

/// A command implementation. Receives the arguments after the command name.
pub type Handler = fn(&CommandHandler, &[String]) -> Reply;

/// How many arguments a command accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Any,
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Any => true,
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

/// One row of the command table.
#[derive(Clone, Copy)]
pub struct CommandSpec {
    pub name: &'static str,
    pub arity: Arity,
    pub handler: Handler,
}

/// Every command the server understands.
pub static COMMAND_TABLE: &[CommandSpec] = &[
    CommandSpec {
        name: "ping",
        arity: Arity::Any,
        handler: CommandHandler::cmd_ping,
    },
    CommandSpec {
        name: "echo",
        arity: Arity::Exactly(1),
        handler: CommandHandler::cmd_echo,
    },
    CommandSpec {
        name: "get",
        arity: Arity::Exactly(1),
        handler: CommandHandler::cmd_get,
    },
    CommandSpec {
        name: "set",
        arity: Arity::AtLeast(2),
        handler: CommandHandler::cmd_set,
    },
];

/// Finds the table entry for a lowercase command name.
pub fn lookup(name: &str) -> Option<&'static CommandSpec> {
    COMMAND_TABLE.iter().find(|spec| spec.name == name)
}

/// Runs decoded commands against the store.
#[derive(Clone)]
pub struct CommandHandler {
    storage: Arc<Store>,
}

impl CommandHandler {
    pub fn new(storage: Arc<Store>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Arc<Store> {
        &self.storage
    }

    /// Executes a command and returns the reply to send.
    ///
    /// Unknown names produce `-ERR unknown command '<name>'`.
    pub fn execute(&self, command: &Command) -> Reply {
        self.dispatch(&command.name, &command.args)
            .unwrap_or_else(|| Reply::unknown_command(&command.name))
    }

    /// Runs `name` with `args`, or returns `None` if no such command exists.
    pub fn dispatch(&self, name: &str, args: &[String]) -> Option<Reply> {
        let spec = lookup(name)?;

        if !spec.arity.accepts(args.len()) {
            return Some(Reply::wrong_arity(spec.name));
        }

        Some((spec.handler)(self, args))
    }

    /// PING [anything ...]
    fn cmd_ping(&self, _args: &[String]) -> Reply {
        Reply::pong()
    }

    /// ECHO message
    fn cmd_echo(&self, args: &[String]) -> Reply {
        Reply::simple(args[0].clone())
    }

    /// GET key
    fn cmd_get(&self, args: &[String]) -> Reply {
        let key = Bytes::from(args[0].clone());

        match self.storage.get(&key) {
            Some(value) => Reply::Simple(value),
            None => Reply::null(),
        }
    }

    /// SET key value [milliseconds]
    fn cmd_set(&self, args: &[String]) -> Reply {
        let ttl = parse_ttl(&args[2..]);

        let key = Bytes::from(args[0].clone());
        let value = Bytes::from(args[1].clone());
        self.storage.set(key, value, ttl);

        Reply::ok()
    }
}

/// Interprets whatever follows `SET key value`.
///
/// Only a non-negative integer in the first position sets a TTL, in milliseconds.
/// Any other token (`PX` included) means no expiry, and everything after the
/// first token is ignored.
fn parse_ttl(options: &[String]) -> Option<Duration> {
    options
        .first()?
        .parse::<u64>()
        .ok()
        .map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn create_handler() -> CommandHandler {
        CommandHandler::new(Arc::new(Store::new()))
    }

    fn make_command(parts: &[&str]) -> Command {
        Command::new(
            parts[0],
            parts[1..].iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn test_ping() {
        let handler = create_handler();

        assert_eq!(handler.execute(&make_command(&["ping"])), Reply::pong());
        assert_eq!(
            handler.execute(&make_command(&["ping", "hello", "there"])),
            Reply::pong()
        );
    }

    #[test]
    fn test_echo() {
        let handler = create_handler();

        let reply = handler.execute(&make_command(&["echo", "Hello"]));
        assert_eq!(reply.serialize(), b"+Hello\r\n");
    }

    #[test]
    fn test_echo_wrong_arity() {
        let handler = create_handler();

        let reply = handler.execute(&make_command(&["echo"]));
        assert_eq!(reply, Reply::wrong_arity("echo"));

        let reply = handler.execute(&make_command(&["echo", "a", "b"]));
        assert!(reply.is_error());
    }

    #[test]
    fn test_set_get() {
        let handler = create_handler();

        assert_eq!(handler.execute(&make_command(&["set", "a", "1"])), Reply::ok());

        let reply = handler.execute(&make_command(&["get", "a"]));
        assert_eq!(reply.serialize(), b"+1\r\n");
    }

    #[test]
    fn test_get_nonexistent() {
        let handler = create_handler();

        let reply = handler.execute(&make_command(&["get", "missing"]));
        assert_eq!(reply.serialize(), b"$-1\r\n");
    }

    #[test]
    fn test_get_wrong_arity() {
        let handler = create_handler();

        assert_eq!(
            handler.execute(&make_command(&["get"])),
            Reply::wrong_arity("get")
        );
    }

    #[test]
    fn test_set_wrong_arity() {
        let handler = create_handler();

        assert_eq!(
            handler.execute(&make_command(&["set", "a"])),
            Reply::wrong_arity("set")
        );
        assert!(handler.storage().is_empty());
    }

    #[test]
    fn test_set_zero_ttl_expires() {
        let handler = create_handler();

        assert_eq!(
            handler.execute(&make_command(&["set", "a", "1", "0"])),
            Reply::ok()
        );

        thread::sleep(Duration::from_millis(2));

        let reply = handler.execute(&make_command(&["get", "a"]));
        assert_eq!(reply.serialize(), b"$-1\r\n");
        assert!(!handler.storage().contains_raw(&Bytes::from("a")));
    }

    #[test]
    fn test_set_with_ttl() {
        let handler = create_handler();

        handler.execute(&make_command(&["set", "a", "1", "50"]));
        assert_eq!(
            handler.execute(&make_command(&["get", "a"])),
            Reply::simple("1")
        );

        thread::sleep(Duration::from_millis(100));
        assert!(handler.execute(&make_command(&["get", "a"])).is_null());
    }

    #[test]
    fn test_set_px_token_means_no_expiry() {
        let handler = create_handler();

        assert_eq!(
            handler.execute(&make_command(&["set", "a", "1", "PX", "0"])),
            Reply::ok()
        );
        assert_eq!(
            handler.execute(&make_command(&["set", "b", "2", "px", "0"])),
            Reply::ok()
        );

        thread::sleep(Duration::from_millis(2));
        assert_eq!(
            handler.execute(&make_command(&["get", "a"])),
            Reply::simple("1")
        );
        assert_eq!(
            handler.execute(&make_command(&["get", "b"])),
            Reply::simple("2")
        );
    }

    #[test]
    fn test_set_lone_px_never_expires() {
        let handler = create_handler();

        assert_eq!(
            handler.execute(&make_command(&["set", "a", "1", "px"])),
            Reply::ok()
        );
        thread::sleep(Duration::from_millis(2));
        assert_eq!(
            handler.execute(&make_command(&["get", "a"])),
            Reply::simple("1")
        );
    }

    #[test]
    fn test_set_non_numeric_ttl_still_writes() {
        let handler = create_handler();

        let reply = handler.execute(&make_command(&["set", "a", "1", "soon"]));
        assert_eq!(reply.serialize(), b"+OK\r\n");

        let reply = handler.execute(&make_command(&["set", "b", "2", "-5"]));
        assert_eq!(reply.serialize(), b"+OK\r\n");

        thread::sleep(Duration::from_millis(2));
        assert_eq!(
            handler.execute(&make_command(&["get", "a"])),
            Reply::simple("1")
        );
        assert_eq!(
            handler.execute(&make_command(&["get", "b"])),
            Reply::simple("2")
        );
    }

    #[test]
    fn test_set_ignores_trailing_arguments() {
        let handler = create_handler();

        let reply = handler.execute(&make_command(&["set", "c", "1", "60000", "x"]));
        assert_eq!(reply.serialize(), b"+OK\r\n");
        assert_eq!(
            handler.execute(&make_command(&["get", "c"])),
            Reply::simple("1")
        );

        let reply = handler.execute(&make_command(&["set", "d", "1", "0", "x", "y"]));
        assert_eq!(reply, Reply::ok());
        assert!(handler.execute(&make_command(&["get", "d"])).is_null());
    }

    #[test]
    fn test_unknown_command() {
        let handler = create_handler();

        let reply = handler.execute(&make_command(&["foo"]));
        assert_eq!(reply.serialize(), b"-ERR unknown command 'foo'\r\n");
    }

    #[test]
    fn test_dispatch_unknown_is_none() {
        let handler = create_handler();
        assert!(handler.dispatch("flushall", &[]).is_none());
    }

    #[test]
    fn test_lookup() {
        for name in ["ping", "echo", "get", "set"] {
            assert_eq!(lookup(name).map(|spec| spec.name), Some(name));
        }
        assert!(lookup("PING").is_none());
        assert!(lookup("del").is_none());
    }
}
