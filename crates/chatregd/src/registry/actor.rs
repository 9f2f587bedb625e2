//! Registry actor - owns the participant map and processes commands.
//!
//! The actor runs in a single task and handles commands sequentially,
//! so all map mutations are serialized without an explicit lock.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::{debug, info};

use super::commands::RegistryCommand;

/// The registry actor - single owner of the identity → nickname map.
///
/// Keys are connection identities (derived from the remote peer
/// address, not guaranteed unique — clients behind one proxy share an
/// identity). At most one entry exists per identity; a `Put` for a
/// registered identity overwrites the previous nickname.
pub struct RegistryActor {
    /// Command receiver.
    receiver: mpsc::Receiver<RegistryCommand>,

    /// Current participants: identity → nickname.
    participants: HashMap<String, String>,
}

impl RegistryActor {
    /// Creates a new registry actor.
    pub fn new(receiver: mpsc::Receiver<RegistryCommand>) -> Self {
        Self {
            receiver,
            participants: HashMap::new(),
        }
    }

    /// Runs the actor event loop.
    ///
    /// Processes commands in arrival order until the channel closes
    /// (all handles dropped). Call this in a spawned task.
    pub async fn run(mut self) {
        info!("Registry actor starting");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd);
        }

        info!(
            participants = self.participants.len(),
            "Registry actor stopped"
        );
    }

    /// Dispatches a command to the appropriate handler.
    ///
    /// Response send failures are ignored - the requesting session may
    /// have dropped its receiver while disconnecting.
    fn handle_command(&mut self, cmd: RegistryCommand) {
        match cmd {
            RegistryCommand::Put {
                identity,
                name,
                respond_to,
            } => {
                let previous = self.participants.insert(identity.clone(), name.clone());
                debug!(
                    identity = %identity,
                    name = %name,
                    replaced = previous.is_some(),
                    total = self.participants.len(),
                    "Participant registered"
                );
                let _ = respond_to.send(previous);
            }
            RegistryCommand::Remove {
                identity,
                respond_to,
            } => {
                let removed = self.participants.remove(&identity);
                if removed.is_some() {
                    debug!(
                        identity = %identity,
                        total = self.participants.len(),
                        "Participant removed"
                    );
                }
                let _ = respond_to.send(removed);
            }
            RegistryCommand::Snapshot { respond_to } => {
                let entries: Vec<(String, String)> = self
                    .participants
                    .iter()
                    .map(|(identity, name)| (identity.clone(), name.clone()))
                    .collect();
                let _ = respond_to.send(entries);
            }
        }
    }
}
