//! Request logger.
//!
//! Listens on `0.0.0.0:1080`, logs every GET and POST request (path,
//! method, headers, body) and answers `200 OK`.
//!
//! ```text
//!   client ──▶ net::Listener ──▶ http::HttpServer ──▶ handler ──▶ RecordSink
//!                                                        │
//!   client ◀──────────────── 200 "OK" ◀──────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use request_logger::config::{load_config, ServerConfig};
use request_logger::lifecycle::{wait_for_termination, Shutdown};
use request_logger::net::Listener;
use request_logger::observability::{init_logging, TracingSink};
use request_logger::HttpServer;

#[derive(Parser)]
#[command(name = "request-logger")]
#[command(about = "HTTP server that logs every request it receives", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };

    init_logging(&config.observability)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        keep_alive = config.listener.keep_alive,
        "Configuration loaded"
    );

    let listener = Listener::bind(&config.listener).await?;
    let port = listener.local_addr()?.port();
    println!("Server running on http://localhost:{}", port);

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_termination().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(config, Arc::new(TracingSink));
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
