//! TCP server for the chatreg daemon.
//!
//! The server:
//! - Listens on a TCP socket for client connections
//! - Spawns one session task per accepted connection
//! - Bounds concurrently running sessions with a worker pool
//! - Supports graceful shutdown via CancellationToken
//!
//! The accept step itself is never blocked by a saturated pool; a
//! newly accepted socket waits for a free worker before its session
//! begins.

mod connection;
mod session;

pub use connection::{Connection, ConnectionError, MAX_LINE_LEN};
pub use session::Session;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::registry::RegistryHandle;

/// TCP server for the chatreg daemon.
///
/// Constructs exactly one `Connection` + `Session` per accepted
/// socket, all bound to the one shared registry.
pub struct ChatServer {
    /// Bound listening socket.
    listener: TcpListener,

    /// Handle to the participant registry, cloned into every session.
    registry: RegistryHandle,

    /// Cancellation token for graceful shutdown.
    cancel_token: CancellationToken,

    /// Nickname length bound handed to every session.
    max_name_len: usize,

    /// Worker pool: one permit per concurrently running session.
    workers: Arc<Semaphore>,
}

impl ChatServer {
    /// Binds the listener and prepares the worker pool.
    pub async fn bind(
        config: &ServerConfig,
        registry: RegistryHandle,
        cancel_token: CancellationToken,
    ) -> Result<Self, ServerError> {
        let addr = config.bind_addr();
        let listener = TcpListener::bind(addr).await.map_err(|e| ServerError::Bind {
            addr,
            error: e.to_string(),
        })?;

        info!(
            addr = %addr,
            max_clients = config.max_clients,
            max_name_len = config.max_name_len,
            "Server listening"
        );

        Ok(Self {
            listener,
            registry,
            cancel_token,
            max_name_len: config.max_name_len,
            workers: Arc::new(Semaphore::new(config.max_clients)),
        })
    }

    /// Returns the bound address (useful with port 0).
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.listener
            .local_addr()
            .map_err(|e| ServerError::Listener(e.to_string()))
    }

    /// Runs the server.
    ///
    /// Accepts connections until the cancellation token is triggered.
    /// Accept failures are logged and the loop continues; in-flight
    /// sessions are not interrupted by shutdown.
    pub async fn run(&self) {
        loop {
            tokio::select! {
                _ = self.cancel_token.cancelled() => {
                    info!("Server shutdown requested");
                    break;
                }

                result = self.listener.accept() => {
                    match result {
                        Ok((stream, peer)) => self.handle_connection(stream, peer),
                        Err(e) => {
                            error!(error = %e, "Failed to accept connection");
                        }
                    }
                }
            }
        }

        info!("Server stopped");
    }

    /// Hands an accepted socket to a session task.
    ///
    /// The task first acquires a worker permit; once the pool is
    /// saturated, sessions queue here in arrival order until running
    /// connections finish.
    fn handle_connection(&self, stream: TcpStream, peer: SocketAddr) {
        let identity = peer.ip().to_string();
        info!(peer = %peer, identity = %identity, "Connection accepted");

        let registry = self.registry.clone();
        let workers = Arc::clone(&self.workers);
        let max_name_len = self.max_name_len;

        tokio::spawn(async move {
            let _permit = match workers.acquire_owned().await {
                Ok(permit) => permit,
                // Semaphore closed: the server is going away
                Err(_) => return,
            };

            let (reader, writer) = stream.into_split();
            let conn = Connection::new(reader, writer, identity, registry);
            Session::new(conn, max_name_len).run().await;
        });
    }
}

/// Errors that can occur in server setup.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Could not bind the listening socket.
    #[error("failed to bind {addr}: {error}")]
    Bind { addr: SocketAddr, error: String },

    /// Listener introspection failed.
    #[error("listener error: {0}")]
    Listener(String),
}
