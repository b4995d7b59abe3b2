// src/exec/state.rs

//! Lifecycle state of a [`LocalCommand`](super::LocalCommand).
//!
//! ```text
//! Unstarted --start--> Running --exit--> Exited
//!                         \----kill----> Killed
//! ```
//!
//! Terminal states are never left. Only the supervisor task moves a command
//! out of `Running`.

use std::fmt;
use std::process::ExitStatus;

use tokio::sync::{mpsc, oneshot};

/// Reply channel for a single kill request.
pub(crate) type KillReply = oneshot::Sender<std::io::Result<()>>;

/// Public, handle-free view of the lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandState {
    Unstarted,
    Running,
    Exited,
    Killed,
}

impl CommandState {
    pub fn is_terminal(self) -> bool {
        matches!(self, CommandState::Exited | CommandState::Killed)
    }
}

impl fmt::Display for CommandState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CommandState::Unstarted => "unstarted",
            CommandState::Running => "running",
            CommandState::Exited => "exited",
            CommandState::Killed => "killed",
        };
        f.write_str(label)
    }
}

/// Internal state, carrying the pid and the kill channel into the
/// supervisor while the process is alive.
#[derive(Debug)]
pub(crate) enum ProcessState {
    Unstarted,
    Running {
        pid: u32,
        kill_tx: mpsc::UnboundedSender<KillReply>,
    },
    Exited {
        pid: u32,
        status: Option<ExitStatus>,
    },
    Killed {
        pid: u32,
        status: Option<ExitStatus>,
    },
}

impl ProcessState {
    pub(crate) fn tag(&self) -> CommandState {
        match self {
            ProcessState::Unstarted => CommandState::Unstarted,
            ProcessState::Running { .. } => CommandState::Running,
            ProcessState::Exited { .. } => CommandState::Exited,
            ProcessState::Killed { .. } => CommandState::Killed,
        }
    }

    /// Last known pid. Terminal states keep the pid of the process they
    /// describe.
    pub(crate) fn pid(&self) -> Option<u32> {
        match self {
            ProcessState::Unstarted => None,
            ProcessState::Running { pid, .. }
            | ProcessState::Exited { pid, .. }
            | ProcessState::Killed { pid, .. } => Some(*pid),
        }
    }

    pub(crate) fn exit_status(&self) -> Option<ExitStatus> {
        match self {
            ProcessState::Exited { status, .. } | ProcessState::Killed { status, .. } => *status,
            _ => None,
        }
    }

    pub(crate) fn kill_sender(&self) -> Option<mpsc::UnboundedSender<KillReply>> {
        match self {
            ProcessState::Running { kill_tx, .. } => Some(kill_tx.clone()),
            _ => None,
        }
    }
}
