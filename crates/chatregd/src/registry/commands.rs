//! Registry actor commands and errors.

use thiserror::Error;
use tokio::sync::oneshot;

/// Commands sent to the registry actor.
///
/// Each command carries a oneshot channel for the response, enabling
/// request-response over the actor's mpsc queue without blocking.
#[derive(Debug)]
pub enum RegistryCommand {
    /// Insert or replace the nickname bound to an identity.
    ///
    /// Responds with the previous nickname, or `None` if the identity
    /// was not registered before.
    Put {
        /// Connection identity (string form of the remote peer address).
        identity: String,
        /// Display name chosen by the client.
        name: String,
        /// Channel to send the prior binding on.
        respond_to: oneshot::Sender<Option<String>>,
    },

    /// Delete the binding for an identity, if present.
    ///
    /// Responds with the removed nickname, or `None` if the identity
    /// was not registered. Removing an absent identity is a no-op,
    /// never an error.
    Remove {
        /// Connection identity to deregister.
        identity: String,
        /// Channel to send the removed binding on.
        respond_to: oneshot::Sender<Option<String>>,
    },

    /// Take a point-in-time copy of all (identity, nickname) pairs.
    ///
    /// The response is an owned vector; later mutations never show
    /// through it and the reader holds no lock.
    Snapshot {
        /// Channel to send the copied entries on.
        respond_to: oneshot::Sender<Vec<(String, String)>>,
    },
}

/// Errors that can occur when talking to the registry actor.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// The actor has shut down and the command channel is closed.
    #[error("registry channel closed")]
    ChannelClosed,
}
