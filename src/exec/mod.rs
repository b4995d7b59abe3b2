// src/exec/mod.rs

//! Process execution layer.
//!
//! This module runs a configured shell command as a local child process using
//! `tokio::process::Command`, and lets other flows stop it or query it while
//! it runs.
//!
//! - [`command`] owns [`LocalCommand`], the executor callers interact with.
//! - [`state`] holds the explicit lifecycle state machine.
//! - [`supervisor`] owns the child process and serves kill requests while
//!   waiting for it to exit.
//! - [`output`] pumps bytes between the child's standard streams and the
//!   caller's sinks.

pub mod command;
pub mod output;
pub mod state;
pub(crate) mod supervisor;

pub use command::LocalCommand;
pub use output::OutputSink;
pub use state::CommandState;
