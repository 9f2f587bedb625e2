//! Chatreg Daemon - chat presence registry server
//!
//! This crate provides the core infrastructure for the chatreg daemon:
//! - `config` - Server configuration and protocol limits
//! - `registry` - Participant registry actor (identity → nickname)
//! - `server` - TCP acceptor, per-connection facade, and session state machine
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   ChatServer    │
//! │  (TcpListener)  │
//! └───────┬─────────┘
//!         │ accept()
//!         ▼
//! ┌─────────────────┐     ┌─────────────────┐
//! │     Session     │────▶│  RegistryHandle │
//! │  (per client)   │     │  (mpsc + oneshot)│
//! └───────┬─────────┘     └────────┬────────┘
//!         │ line I/O               │ commands
//!         ▼                        ▼
//! ┌─────────────────┐     ┌─────────────────┐
//! │   Connection    │     │  RegistryActor  │
//! │   (facade)      │     │ (state owner)   │
//! └─────────────────┘     └─────────────────┘
//! ```
//!
//! One session runs per accepted connection, bounded by a worker pool
//! of `max_clients` permits. The registry actor is the only owner of
//! shared state; sessions reach it through cloned handles.

pub mod config;
pub mod registry;
pub mod server;
