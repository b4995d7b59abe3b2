// src/errors.rs

//! Crate-wide error type and result alias.

use std::process::ExitStatus;

use thiserror::Error;

use crate::exec::CommandState;
use crate::expand::ExpansionError;

#[derive(Error, Debug)]
pub enum LocalCmdError {
    #[error("Expansion error: {0}")]
    Expansion(#[from] ExpansionError),

    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("operation '{command}' was canceled and terminated{}", kill_suffix(.kill_error))]
    Canceled {
        command: String,
        kill_error: Option<std::io::Error>,
    },

    #[error("command '{command}' exited unsuccessfully: {status}")]
    ProcessExit { command: String, status: ExitStatus },

    #[error("waiting for '{command}' failed: {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to kill '{command}': {source}")]
    Kill {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command '{command}' cannot be started again (state: {state})")]
    AlreadyStarted {
        command: String,
        state: CommandState,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LocalCmdError {
    /// True when the operation was aborted by cancellation rather than
    /// failing on its own.
    pub fn is_canceled(&self) -> bool {
        matches!(self, LocalCmdError::Canceled { .. })
    }

    /// Exit code of the process, if it ran to completion and reported one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            LocalCmdError::ProcessExit { status, .. } => status.code(),
            _ => None,
        }
    }
}

fn kill_suffix(kill_error: &Option<std::io::Error>) -> String {
    match kill_error {
        Some(err) => format!(" (kill failed: {err})"),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, LocalCmdError>;
