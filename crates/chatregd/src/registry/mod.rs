//! Participant registry using the actor pattern.
//!
//! The registry is the sole owner of the shared identity → nickname
//! map. It receives commands via a tokio mpsc channel and processes
//! them one at a time, so `put`, `remove`, and `snapshot` are
//! serialized against each other and a snapshot can never observe a
//! partially applied mutation. The channel delivers commands in
//! arrival order, which gives every connection first-come-first-served
//! access to the map under sustained load.

use tokio::sync::mpsc;

mod actor;
mod commands;
mod handle;

pub use actor::RegistryActor;
pub use commands::{RegistryCommand, RegistryError};
pub use handle::RegistryHandle;

/// Command channel buffer size.
const COMMAND_BUFFER: usize = 100;

/// Spawn the registry actor and return a handle for interaction.
///
/// The actor task runs until every handle has been dropped.
pub fn spawn_registry() -> RegistryHandle {
    let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);

    let actor = RegistryActor::new(cmd_rx);
    tokio::spawn(actor.run());

    RegistryHandle::new(cmd_tx)
}
