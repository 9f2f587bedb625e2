//! Parsing client command lines.

/// A single client command, parsed from one input line.
///
/// Matching is on the first whitespace-delimited token, case-sensitive,
/// against the literal keywords `NEW`, `INFO`, `BYE`. Anything else
/// (including an empty line) is `Unknown` and fatal to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `NEW <name>` - register or overwrite the display name for this
    /// connection. The name is the second token; trailing tokens are
    /// ignored. `None` when the client sent no argument.
    New { name: Option<String> },

    /// `INFO` - request the current participant listing.
    Info,

    /// `BYE` - request a graceful disconnect.
    Bye,

    /// Anything unrecognized. Carries the offending first token
    /// (empty for a blank line) for the error reply.
    Unknown { token: String },
}

impl Command {
    /// Parses one input line into a command.
    ///
    /// Only the first two tokens are ever consumed; extra trailing
    /// tokens are not validated and not rejected.
    pub fn parse(line: &str) -> Command {
        let mut tokens = line.split_whitespace();

        match tokens.next() {
            Some("NEW") => Command::New {
                name: tokens.next().map(str::to_owned),
            },
            Some("INFO") => Command::Info,
            Some("BYE") => Command::Bye,
            Some(other) => Command::Unknown {
                token: other.to_owned(),
            },
            None => Command::Unknown {
                token: String::new(),
            },
        }
    }
}
