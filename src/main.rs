//! cors-relay
//!
//! Forwards `/<path>?url=<target>&...` to `<target>?...` and relays the
//! answer back with permissive CORS headers, so browser apps can fetch
//! resources (playlists, media, APIs) from origins that do not allow them.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request          ┌──────────────────────────────────────────┐
//!     ────────────────────────┼─▶ http::server (axum + tower-http layers) │
//!                             │        │                                 │
//!                             │        ▼                                 │
//!                             │   relay::forward ──▶ relay::client ──────┼──▶ Target
//!                             │        │              (reqwest)          │
//!     Client Response         │        ▼                                 │
//!     ◀───────────────────────┼── http::response ◀───────────────────────┼─── Target
//!                             │                                          │
//!                             │  config · observability · lifecycle      │
//!                             └──────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use cors_relay::http::HttpServer;
use cors_relay::lifecycle::signals::wait_for_signal;
use cors_relay::lifecycle::startup::{resolve_config, Overrides};
use cors_relay::lifecycle::Shutdown;
use cors_relay::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "cors-relay", version)]
#[command(about = "HTTP forwarding relay that adds permissive CORS headers", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listening port (overrides PORT and the config file).
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level used when RUST_LOG is unset.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let overrides = Overrides {
        port: cli.port,
        log_level: cli.log_level,
    };
    let config = resolve_config(cli.config.as_deref(), &overrides, |key| std::env::var(key).ok())?;

    logging::init(&config.observability);

    tracing::info!("cors-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        port = config.listener.port,
        path = %config.relay.path,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(config.listener.socket_addr()?).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(address = %local_addr, "Listening for connections");
    tracing::info!(
        "Access it at http://localhost:{}{}?{}=<target url>",
        local_addr.port(),
        config.relay.path,
        config.relay.target_param
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
