//! Chatreg Protocol - Wire protocol for the presence registry server
//!
//! This crate provides the line-level protocol types shared by the
//! server and by test clients: client command parsing, nickname
//! validation, and server reply formatting.
//!
//! The protocol is newline-delimited ASCII, one command per line:
//!
//! ```text
//! C: NEW alice          S: OK
//! C: INFO               S: LIST 1 203.0.113.7 alice
//! C: BYE                S: BYE
//! ```

pub mod command;
pub mod name;
pub mod reply;

pub use command::Command;
pub use name::{validate, NameReject};
pub use reply::Reply;
