//! Connection facade for one accepted client.
//!
//! A `Connection` translates transport I/O into line-level messages
//! and mediates registry access for exactly one connection. It is
//! generic over the stream halves so sessions can be driven over
//! in-memory pipes in tests.

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tracing::{debug, info};

use crate::registry::{RegistryError, RegistryHandle};

/// Maximum accepted input line length in bytes, delimiter included.
pub const MAX_LINE_LEN: usize = 1024;

/// Per-connection facade over buffered line I/O and the registry.
///
/// The identity is the string form of the remote peer's IP address.
/// It is not guaranteed unique: clients behind one proxy share an
/// identity, and a later registration simply overwrites the name.
pub struct Connection<R, W> {
    /// Buffered reader for incoming lines.
    reader: BufReader<R>,

    /// Buffered writer for outgoing replies.
    writer: BufWriter<W>,

    /// Registry key for this connection.
    identity: String,

    /// Handle to the shared participant registry.
    registry: RegistryHandle,

    /// Set once `close` has run; makes teardown idempotent.
    closed: bool,
}

impl<R, W> Connection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a new connection facade.
    pub fn new(
        reader: R,
        writer: W,
        identity: impl Into<String>,
        registry: RegistryHandle,
    ) -> Self {
        let identity = identity.into();
        info!(identity = %identity, "Connected");

        Self {
            reader: BufReader::new(reader),
            writer: BufWriter::new(writer),
            identity,
            registry,
            closed: false,
        }
    }

    /// Returns this connection's registry identity.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Reads one newline-terminated line from the peer.
    ///
    /// Returns `Ok(None)` when the peer closed the stream before
    /// sending another delimiter (graceful end-of-stream, not an
    /// error). The trailing delimiter is stripped. No line is ever
    /// returned twice.
    pub async fn receive_line(&mut self) -> Result<Option<String>, ConnectionError> {
        let mut line = String::new();

        let bytes_read = self
            .reader
            .read_line(&mut line)
            .await
            .map_err(|e| ConnectionError::Io(e.to_string()))?;

        if bytes_read == 0 {
            return Ok(None);
        }

        if bytes_read > MAX_LINE_LEN {
            return Err(ConnectionError::LineTooLong {
                len: bytes_read,
                max: MAX_LINE_LEN,
            });
        }

        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }

        debug!(identity = %self.identity, line = %line, "Received");
        Ok(Some(line))
    }

    /// Sends one reply line to the peer.
    ///
    /// Appends the line terminator and flushes immediately, so every
    /// reply reaches the transport before the next command is read.
    pub async fn send_line(&mut self, text: &str) -> Result<(), ConnectionError> {
        debug!(identity = %self.identity, line = %text, "Sending");

        let result = async {
            self.writer.write_all(text.as_bytes()).await?;
            self.writer.write_all(b"\n").await?;
            self.writer.flush().await?;
            Ok::<(), std::io::Error>(())
        }
        .await;

        result.map_err(|e| ConnectionError::Io(e.to_string()))
    }

    /// Registers `name` for this connection's identity.
    ///
    /// Issues exactly one registry insert. A repeated login from the
    /// same identity overwrites the previous name; the protocol does
    /// not report that case distinctly.
    pub async fn login(&mut self, name: &str) -> Result<(), ConnectionError> {
        let previous = self
            .registry
            .put(self.identity.clone(), name.to_string())
            .await?;

        match previous {
            None => info!(identity = %self.identity, name = %name, "Participant joined"),
            Some(old) => info!(
                identity = %self.identity,
                name = %name,
                previous = %old,
                "Participant renamed"
            ),
        }

        Ok(())
    }

    /// Removes this connection's identity from the registry.
    ///
    /// Safe to call any number of times; removing an absent identity
    /// is a no-op. A registry that is already gone (daemon shutting
    /// down) is not an error here.
    pub async fn logout(&mut self) {
        match self.registry.remove(self.identity.clone()).await {
            Ok(Some(name)) => info!(identity = %self.identity, name = %name, "Participant left"),
            Ok(None) => {}
            Err(RegistryError::ChannelClosed) => {
                debug!(identity = %self.identity, "Registry already stopped during logout");
            }
        }
    }

    /// Builds the participant listing from a registry snapshot.
    ///
    /// Format: `<count> <identity1> <name1> <identity2> <name2> ...`,
    /// in snapshot order.
    pub async fn participants(&mut self) -> Result<String, ConnectionError> {
        let entries = self.registry.snapshot().await?;

        let mut listing = entries.len().to_string();
        for (identity, name) in &entries {
            listing.push(' ');
            listing.push_str(identity);
            listing.push(' ');
            listing.push_str(name);
        }

        Ok(listing)
    }

    /// Releases the transport and deregisters this connection.
    ///
    /// Flushes and shuts down the writer, then unconditionally logs
    /// out, so no exit path can leave a stale registry entry.
    /// Idempotent; never raises, even on a transport that is already
    /// gone.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let Err(e) = self.writer.flush().await {
            debug!(identity = %self.identity, error = %e, "Flush on close failed");
        }
        if let Err(e) = self.writer.shutdown().await {
            debug!(identity = %self.identity, error = %e, "Shutdown on close failed");
        }

        self.logout().await;

        info!(identity = %self.identity, "Disconnected");
    }
}

/// Errors that can occur during connection handling.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// Transport read or write failure.
    #[error("I/O error: {0}")]
    Io(String),

    /// The peer sent a line exceeding the accepted maximum.
    #[error("line too long: {len} bytes (max: {max})")]
    LineTooLong { len: usize, max: usize },

    /// The registry actor is gone.
    #[error("registry unavailable: {0}")]
    Registry(#[from] RegistryError),
}
