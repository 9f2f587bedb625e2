//! Client interface for interacting with the registry actor.
//!
//! The `RegistryHandle` is a cheap-to-clone facade over the actor's
//! command channel. Every connection's session holds one clone; all
//! methods are async and map channel closure to
//! `RegistryError::ChannelClosed`.

use tokio::sync::{mpsc, oneshot};

use super::commands::{RegistryCommand, RegistryError};

/// Handle for interacting with the registry actor.
#[derive(Clone)]
pub struct RegistryHandle {
    /// Command sender to the actor.
    sender: mpsc::Sender<RegistryCommand>,
}

impl RegistryHandle {
    /// Create a new registry handle.
    pub fn new(sender: mpsc::Sender<RegistryCommand>) -> Self {
        Self { sender }
    }

    /// Insert or replace the nickname bound to `identity`.
    ///
    /// Returns the previous nickname if the identity was already
    /// registered, `None` if this is a new identity.
    ///
    /// # Errors
    ///
    /// `RegistryError::ChannelClosed` if the actor has shut down.
    pub async fn put(
        &self,
        identity: String,
        name: String,
    ) -> Result<Option<String>, RegistryError> {
        let (tx, rx) = oneshot::channel();

        self.sender
            .send(RegistryCommand::Put {
                identity,
                name,
                respond_to: tx,
            })
            .await
            .map_err(|_| RegistryError::ChannelClosed)?;

        rx.await.map_err(|_| RegistryError::ChannelClosed)
    }

    /// Delete the binding for `identity`, if present.
    ///
    /// Returns the removed nickname, or `None` if the identity was not
    /// registered. Idempotent: removing an absent identity is a no-op.
    ///
    /// # Errors
    ///
    /// `RegistryError::ChannelClosed` if the actor has shut down.
    pub async fn remove(&self, identity: String) -> Result<Option<String>, RegistryError> {
        let (tx, rx) = oneshot::channel();

        self.sender
            .send(RegistryCommand::Remove {
                identity,
                respond_to: tx,
            })
            .await
            .map_err(|_| RegistryError::ChannelClosed)?;

        rx.await.map_err(|_| RegistryError::ChannelClosed)
    }

    /// Take a consistent point-in-time copy of all participants.
    ///
    /// The returned entries are owned; mutations applied after the
    /// snapshot was taken never show through it. The count equals the
    /// number of live entries at the moment the actor processed the
    /// command.
    ///
    /// # Errors
    ///
    /// `RegistryError::ChannelClosed` if the actor has shut down.
    pub async fn snapshot(&self) -> Result<Vec<(String, String)>, RegistryError> {
        let (tx, rx) = oneshot::channel();

        self.sender
            .send(RegistryCommand::Snapshot { respond_to: tx })
            .await
            .map_err(|_| RegistryError::ChannelClosed)?;

        rx.await.map_err(|_| RegistryError::ChannelClosed)
    }

    /// Check if the actor is still running.
    pub fn is_connected(&self) -> bool {
        !self.sender.is_closed()
    }
}
