// src/exec/supervisor.rs

//! Per-process supervisor task.
//!
//! The supervisor is the only owner of the `Child`. It waits for the process
//! to exit while serving kill requests, so observing completion and killing
//! never contend for the same lock. When the process is gone it records the
//! terminal state and reports through a one-shot channel.

use std::process::ExitStatus;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::process::Child;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::exec::command::{Inner, write_lock};
use crate::exec::state::{KillReply, ProcessState};

/// How long a naturally exited process gets to finish delivering output.
///
/// Background jobs that inherited the pipes can keep them open forever; the
/// completion is not held hostage to them.
const OUTPUT_DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Outcome reported to `run` once the process is gone.
#[derive(Debug)]
pub(crate) struct Completion {
    pub(crate) status: std::io::Result<ExitStatus>,
    pub(crate) killed: bool,
}

pub(crate) struct Supervisor {
    pub(crate) pid: u32,
    pub(crate) child: Child,
    pub(crate) pumps: Vec<JoinHandle<()>>,
    pub(crate) kill_rx: mpsc::UnboundedReceiver<KillReply>,
    pub(crate) done_tx: oneshot::Sender<Completion>,
    pub(crate) shared: Arc<RwLock<Inner>>,
}

impl Supervisor {
    /// Detach the supervisor. Its lifetime follows the process, not the
    /// caller that started it.
    pub(crate) fn spawn(self) {
        tokio::spawn(self.supervise());
    }

    async fn supervise(mut self) {
        let pid = self.pid;
        let mut killed = false;
        let mut kill_open = true;

        let status = loop {
            tokio::select! {
                status = self.child.wait() => break status,

                request = self.kill_rx.recv(), if kill_open => {
                    match request {
                        Some(reply) => {
                            let res = self.child.start_kill();
                            match &res {
                                Ok(()) => {
                                    killed = true;
                                    info!(pid, "kill signal sent to process");
                                }
                                Err(e) => warn!(pid, error = %e, "failed to kill process"),
                            }
                            let _ = reply.send(res);
                        }
                        None => kill_open = false,
                    }
                }
            }
        };

        // The process is reaped: refuse further kill requests. Dropping a
        // pending reply tells its sender there was nothing left to kill.
        self.kill_rx.close();
        while self.kill_rx.try_recv().is_ok() {}

        let exit_status = status.as_ref().ok().copied();
        match &status {
            Ok(s) => info!(
                pid,
                exit_code = s.code().unwrap_or(-1),
                success = s.success(),
                killed,
                "process exited"
            ),
            Err(e) => warn!(pid, error = %e, "waiting for process failed"),
        }

        {
            let mut inner = write_lock(&self.shared);
            inner.state = if killed {
                ProcessState::Killed {
                    pid,
                    status: exit_status,
                }
            } else {
                ProcessState::Exited {
                    pid,
                    status: exit_status,
                }
            };
        }

        // Completion is reported only once the sinks hold everything the
        // process wrote.
        if !killed {
            self.drain_output().await;
        }

        if self.done_tx.send(Completion { status, killed }).is_err() {
            debug!(pid, "no run() waiting for completion");
        }
    }

    async fn drain_output(&mut self) {
        let pid = self.pid;
        for pump in self.pumps.drain(..) {
            match timeout(OUTPUT_DRAIN_GRACE, pump).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => debug!(pid, error = %e, "output pump task failed"),
                Err(_) => warn!(
                    pid,
                    "output still open after process exit; not waiting for it"
                ),
            }
        }
    }
}
