//! Server reply formatting.

use std::fmt;

/// A single server reply, one per processed command line.
///
/// The `Display` form is the exact wire line, without the trailing
/// newline (the transport layer appends it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Command succeeded (`NEW`).
    Ok,

    /// Participant snapshot: `<n> <id1> <name1> ... <idn> <namen>`.
    List(String),

    /// Protocol or validation failure with a description.
    Error(String),

    /// Acknowledges a disconnect request, sent immediately before the
    /// connection is closed.
    Bye,
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Ok => write!(f, "OK"),
            Reply::List(participants) => write!(f, "LIST {participants}"),
            Reply::Error(description) => write!(f, "ERROR {description}"),
            Reply::Bye => write!(f, "BYE"),
        }
    }
}
