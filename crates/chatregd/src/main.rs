//! chatregd - chat presence registry server
//!
//! Clients connect over TCP, register a nickname with `NEW <name>`,
//! query the list of connected participants with `INFO`, and
//! disconnect with `BYE`.
//!
//! # Usage
//!
//! ```bash
//! # Start with defaults (0.0.0.0:50000, 80 workers)
//! chatregd
//!
//! # Custom port and pool size
//! chatregd --port 6000 --max-clients 200
//!
//! # Enable debug logging
//! RUST_LOG=chatregd=debug chatregd
//! ```
//!
//! # Signal Handling
//!
//! SIGTERM/SIGINT trigger a graceful shutdown of the accept loop.

use std::net::{IpAddr, Ipv4Addr};

use anyhow::{bail, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use chatregd::config::{
    ServerConfig, DEFAULT_MAX_CLIENTS, DEFAULT_MAX_NAME_LEN, DEFAULT_PORT,
};
use chatregd::registry::spawn_registry;
use chatregd::server::ChatServer;

/// chatreg daemon - chat presence registry
#[derive(Parser, Debug)]
#[command(name = "chatregd", version, about)]
struct Args {
    /// Address to bind the listener to
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    host: IpAddr,

    /// Port to listen on
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Maximum number of concurrently served connections
    #[arg(long, default_value_t = DEFAULT_MAX_CLIENTS)]
    max_clients: usize,

    /// Maximum nickname length accepted by NEW
    #[arg(long, default_value_t = DEFAULT_MAX_NAME_LEN)]
    max_name_length: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("chatregd=info".parse()?)
                .add_directive("chatreg_protocol=info".parse()?),
        )
        .init();

    if args.max_clients == 0 {
        bail!("--max-clients must be at least 1");
    }
    if args.max_name_length == 0 {
        bail!("--max-name-length must be at least 1");
    }

    let config = ServerConfig {
        host: args.host,
        port: args.port,
        max_clients: args.max_clients,
        max_name_len: args.max_name_length,
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = config.port,
        max_clients = config.max_clients,
        "chatreg daemon starting"
    );

    // Graceful shutdown on SIGTERM/SIGINT
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        if let Err(e) = wait_for_shutdown_signal().await {
            error!(error = %e, "Error waiting for shutdown signal");
        }
        info!("Shutdown signal received");
        shutdown_token.cancel();
    });

    let registry = spawn_registry();
    info!("Participant registry started");

    let server = ChatServer::bind(&config, registry, cancel_token).await?;
    server.run().await;

    info!("chatreg daemon stopped");
    Ok(())
}

/// Waits for a shutdown signal (SIGTERM or SIGINT).
async fn wait_for_shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        info!("Received Ctrl+C");
    }

    Ok(())
}
