//! Session state machine for one client connection.
//!
//! A session reads one line per iteration, interprets it as a
//! protocol command, drives registry mutations through its connection
//! facade, and produces exactly one reply per processed line. It runs
//! until the client says `BYE`, sends an unknown command, or the
//! transport fails.

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, warn};

use chatreg_protocol::{name, Command, Reply};

use super::connection::Connection;

/// Protocol state machine, one instance per connection.
///
/// There is no separate logged-in state: registration status lives in
/// the registry and is only observable through it.
pub struct Session<R, W> {
    /// Facade over this connection's transport and registry access.
    conn: Connection<R, W>,

    /// Configured nickname length bound.
    max_name_len: usize,
}

impl<R, W> Session<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a session over an established connection.
    pub fn new(conn: Connection<R, W>, max_name_len: usize) -> Self {
        Self { conn, max_name_len }
    }

    /// Runs the session to completion.
    ///
    /// Whatever terminates the loop - explicit `BYE`, a fatal protocol
    /// error, end-of-stream, or an I/O failure - teardown funnels into
    /// the single `close` call at the end, which releases the
    /// transport and removes this connection's registry entry.
    pub async fn run(mut self) {
        debug!(identity = %self.conn.identity(), "Session started");

        loop {
            let line = match self.conn.receive_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    debug!(identity = %self.conn.identity(), "Peer closed the stream");
                    break;
                }
                Err(e) => {
                    warn!(identity = %self.conn.identity(), error = %e, "Read failed");
                    break;
                }
            };

            match Command::parse(&line) {
                Command::Bye => {
                    // Deregister first, then acknowledge; the reply
                    // goes out before the transport is torn down.
                    self.conn.logout().await;
                    if let Err(e) = self.conn.send_line(&Reply::Bye.to_string()).await {
                        warn!(identity = %self.conn.identity(), error = %e, "Write failed");
                    }
                    break;
                }

                Command::Info => {
                    let listing = match self.conn.participants().await {
                        Ok(listing) => listing,
                        Err(e) => {
                            warn!(identity = %self.conn.identity(), error = %e, "Snapshot failed");
                            break;
                        }
                    };
                    if let Err(e) = self.conn.send_line(&Reply::List(listing).to_string()).await {
                        warn!(identity = %self.conn.identity(), error = %e, "Write failed");
                        break;
                    }
                }

                Command::New { name } => {
                    let reply = match name::validate(name.as_deref(), self.max_name_len) {
                        Ok(nick) => match self.conn.login(nick).await {
                            Ok(()) => Reply::Ok,
                            Err(e) => {
                                warn!(identity = %self.conn.identity(), error = %e, "Login failed");
                                break;
                            }
                        },
                        Err(reject) => Reply::Error(reject.to_string()),
                    };
                    if let Err(e) = self.conn.send_line(&reply.to_string()).await {
                        warn!(identity = %self.conn.identity(), error = %e, "Write failed");
                        break;
                    }
                }

                Command::Unknown { token } => {
                    // Fatal: best-effort error reply, then terminate.
                    let reply = Reply::Error(format!("unknown command {token}"));
                    if let Err(e) = self.conn.send_line(&reply.to_string()).await {
                        warn!(identity = %self.conn.identity(), error = %e, "Write failed");
                    }
                    break;
                }
            }
        }

        self.conn.close().await;
    }
}
