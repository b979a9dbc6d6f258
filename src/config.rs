//! Server configuration, parsed from the command line.

use crate::protocol::DecodeOptions;
use clap::Parser;

/// Command-line arguments for the cache server
#[derive(Parser, Debug, Clone)]
#[command(name = "flintkv")]
#[command(version)]
#[command(about = "A small in-memory key-value cache speaking a subset of RESP", long_about = None)]
pub struct Config {
    /// Host to bind to
    #[arg(long, default_value = crate::DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = crate::DEFAULT_PORT)]
    pub port: u16,

    /// Maximum number of clients served at once; further clients wait to be accepted
    #[arg(short = 'c', long, default_value_t = crate::DEFAULT_MAX_CONNECTIONS)]
    pub max_connections: usize,

    /// Lowercase command arguments as well as command names (keys become
    /// case-insensitive and ECHO replies in lowercase)
    #[arg(long)]
    pub fold_case: bool,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: crate::DEFAULT_HOST.to_string(),
            port: crate::DEFAULT_PORT,
            max_connections: crate::DEFAULT_MAX_CONNECTIONS,
            fold_case: false,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Returns the bind address as a string
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            fold_arguments: self.fold_case,
        }
    }
}
