//! FlintKV server entry point.
//!
//! Parses the command line, sets up logging, binds the listener and serves
//! clients until Ctrl+C or a fatal accept error.

use anyhow::Context;
use clap::Parser;
use flintkv::{Config, Server};
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

fn print_banner(config: &Config) {
    println!(
        r#"
FlintKV v{} - In-Memory Key-Value Cache
──────────────────────────────────────────
Listening on {} (max {} clients)
Use Ctrl+C to shut down.
"#,
        flintkv::VERSION,
        config.bind_address(),
        config.max_connections,
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    init_logging(&config.log_level);
    print_banner(&config);

    let server = Server::bind(&config)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_address()))?;

    tokio::select! {
        result = server.run() => {
            result.context("Server stopped")?;
        }
        result = signal::ctrl_c() => {
            result.context("Failed to install Ctrl+C handler")?;
            info!("Shutdown signal received, stopping server...");
        }
    }

    let stats = server.storage().stats();
    info!(
        keys = stats.keys,
        gets = stats.get_ops,
        sets = stats.set_ops,
        expired = stats.expired,
        "Server shutdown complete"
    );

    Ok(())
}
