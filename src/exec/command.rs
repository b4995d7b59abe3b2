// src/exec/command.rs

//! The local command executor.

use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::CommandConfig;
use crate::errors::{LocalCmdError, Result};
use crate::exec::output::{OutputSinks, spawn_output_pump, spawn_stdin_pump};
use crate::exec::state::{CommandState, KillReply, ProcessState};
use crate::exec::supervisor::{Completion, Supervisor};
use crate::expand::Expander;

/// State shared between a [`LocalCommand`] and its supervisor task.
#[derive(Debug)]
pub(crate) struct Inner {
    pub(crate) config: CommandConfig,
    pub(crate) state: ProcessState,
    completion: Option<oneshot::Receiver<Completion>>,
}

/// Result of asking the supervisor to kill the process.
enum KillOutcome {
    Delivered,
    NotRunning,
    Failed(std::io::Error),
}

/// Runs one shell command (or script) as a local child process.
///
/// A `LocalCommand` owns at most one process over its whole life:
/// configure, optionally [`prep_to_run`](Self::prep_to_run), then
/// [`start`](Self::start) or [`run`](Self::run) exactly once. It can be shared
/// (e.g. behind an `Arc`) between the flow driving `run` and flows calling
/// [`stop`](Self::stop) or [`pid`](Self::pid).
///
/// Dropping a running command kills its process.
pub struct LocalCommand {
    shared: Arc<RwLock<Inner>>,
    sinks: Mutex<OutputSinks>,
}

impl LocalCommand {
    pub fn new(config: CommandConfig) -> Self {
        Self {
            shared: Arc::new(RwLock::new(Inner {
                config,
                state: ProcessState::Unstarted,
                completion: None,
            })),
            sinks: Mutex::new(OutputSinks::default()),
        }
    }

    /// Send the process's stdout to `sink`. Without a sink stdout is discarded.
    pub fn with_stdout<W>(self, sink: W) -> Self
    where
        W: tokio::io::AsyncWrite + Send + Unpin + 'static,
    {
        lock(&self.sinks).stdout = Some(Box::new(sink));
        self
    }

    /// Send the process's stderr to `sink`. Without a sink stderr is discarded.
    pub fn with_stderr<W>(self, sink: W) -> Self
    where
        W: tokio::io::AsyncWrite + Send + Unpin + 'static,
    {
        lock(&self.sinks).stderr = Some(Box::new(sink));
        self
    }

    /// Expand placeholders in the command text and working directory.
    ///
    /// Each field is expanded and stored on its own, command first. If the
    /// working directory fails, the already-expanded command is kept.
    pub fn prep_to_run<E>(&self, expander: &E) -> Result<()>
    where
        E: Expander + ?Sized,
    {
        let mut inner = write_lock(&self.shared);
        if inner.state.tag() != CommandState::Unstarted {
            return Err(LocalCmdError::AlreadyStarted {
                command: inner.config.command.clone(),
                state: inner.state.tag(),
            });
        }

        inner.config.command = expander.expand(&inner.config.command)?;
        inner.config.working_dir = expander.expand(&inner.config.working_dir)?;

        debug!(
            cmd = %inner.config.command,
            working_dir = %inner.config.working_dir,
            "expanded command configuration"
        );
        Ok(())
    }

    /// Launch the process and return without waiting for it.
    ///
    /// Fails with [`LocalCmdError::AlreadyStarted`] unless the command is
    /// still unstarted; an existing process is never replaced. Must be called
    /// from within a Tokio runtime.
    pub async fn start(&self) -> Result<()> {
        let mut inner = write_lock(&self.shared);

        if inner.state.tag() != CommandState::Unstarted {
            warn!(
                cmd = %inner.config.command,
                state = %inner.state.tag(),
                "start requested for a command that was already started"
            );
            return Err(LocalCmdError::AlreadyStarted {
                command: inner.config.command.clone(),
                state: inner.state.tag(),
            });
        }

        let mut sinks = lock(&self.sinks);
        let mut cmd = build_command(&inner.config);
        cmd.stdout(if sinks.stdout.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stderr(if sinks.stderr.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .kill_on_drop(true);

        info!(
            cmd = %inner.config.command,
            shell = inner.config.effective_shell(),
            script = inner.config.script,
            "starting local command"
        );

        let mut child = cmd.spawn().map_err(|source| LocalCmdError::Spawn {
            command: inner.config.command.clone(),
            source,
        })?;

        // A freshly spawned child always has an id; it is only cleared once
        // the child has been reaped.
        let pid = child.id().unwrap_or_default();

        let mut pumps = Vec::with_capacity(2);
        if let (Some(out), Some(sink)) = (child.stdout.take(), sinks.stdout.take()) {
            pumps.push(spawn_output_pump("stdout", pid, out, sink));
        }
        if let (Some(err), Some(sink)) = (child.stderr.take(), sinks.stderr.take()) {
            pumps.push(spawn_output_pump("stderr", pid, err, sink));
        }
        drop(sinks);

        if let Some(stdin) = child.stdin.take() {
            spawn_stdin_pump(pid, stdin, inner.config.command.clone());
        }

        let (kill_tx, kill_rx) = mpsc::unbounded_channel::<KillReply>();
        let (done_tx, done_rx) = oneshot::channel::<Completion>();

        inner.state = ProcessState::Running { pid, kill_tx };
        inner.completion = Some(done_rx);
        drop(inner);

        info!(pid, "local command started");

        Supervisor {
            pid,
            child,
            pumps,
            kill_rx,
            done_tx,
            shared: Arc::clone(&self.shared),
        }
        .spawn();

        Ok(())
    }

    /// Start the process and wait until it exits or `cancel` fires.
    ///
    /// - Clean exit: `Ok(())`.
    /// - Non-zero or signalled exit: [`LocalCmdError::ProcessExit`].
    /// - Cancellation first: the process is killed and reaped, and
    ///   [`LocalCmdError::Canceled`] is returned with the command text and any
    ///   kill failure attached.
    ///
    /// There is no internal timeout; give `cancel` a deadline if one is needed.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<()> {
        self.start().await?;

        let (command, completion) = {
            let mut inner = write_lock(&self.shared);
            (inner.config.command.clone(), inner.completion.take())
        };
        let Some(mut completion) = completion else {
            return Err(LocalCmdError::Wait {
                command,
                source: std::io::Error::other("completion already consumed"),
            });
        };

        tokio::select! {
            done = &mut completion => finish(command, done),

            _ = cancel.cancelled() => {
                info!(cmd = %command, "run canceled; killing process");
                let kill_error = match self.request_kill().await {
                    KillOutcome::Delivered => {
                        // Wait for the supervisor to reap so the process is
                        // really gone when we return.
                        let _ = completion.await;
                        None
                    }
                    KillOutcome::NotRunning => {
                        // The process exited on its own before the kill;
                        // its exit is the outcome.
                        debug!(cmd = %command, "process already exited when canceled");
                        return finish(command, completion.await);
                    }
                    KillOutcome::Failed(e) => Some(e),
                };
                Err(LocalCmdError::Canceled { command, kill_error })
            }
        }
    }

    /// OS pid of the process, or `None` if it was never started.
    ///
    /// After the process exits (or is killed) the last pid keeps being
    /// returned.
    pub fn pid(&self) -> Option<u32> {
        read_lock(&self.shared).state.pid()
    }

    /// Forcefully kill the running process.
    ///
    /// Stopping a command that is not running is not an error; a warning is
    /// logged instead since it usually points at a caller bug.
    pub async fn stop(&self) -> Result<()> {
        match self.request_kill().await {
            KillOutcome::Delivered => Ok(()),
            KillOutcome::NotRunning => {
                let inner = read_lock(&self.shared);
                warn!(
                    cmd = %inner.config.command,
                    state = %inner.state.tag(),
                    "stop requested but process was never started or already reaped"
                );
                Ok(())
            }
            KillOutcome::Failed(source) => Err(LocalCmdError::Kill {
                command: self.command(),
                source,
            }),
        }
    }

    pub fn state(&self) -> CommandState {
        read_lock(&self.shared).state.tag()
    }

    /// Exit status of a finished process, when the wait succeeded.
    pub fn exit_status(&self) -> Option<ExitStatus> {
        read_lock(&self.shared).state.exit_status()
    }

    /// Current command text (expanded once `prep_to_run` succeeded).
    pub fn command(&self) -> String {
        read_lock(&self.shared).config.command.clone()
    }

    pub fn working_dir(&self) -> String {
        read_lock(&self.shared).config.working_dir.clone()
    }

    /// Snapshot of the full configuration.
    pub fn config(&self) -> CommandConfig {
        read_lock(&self.shared).config.clone()
    }

    async fn request_kill(&self) -> KillOutcome {
        let kill_tx = read_lock(&self.shared).state.kill_sender();
        let Some(kill_tx) = kill_tx else {
            return KillOutcome::NotRunning;
        };

        let (reply_tx, reply_rx) = oneshot::channel();
        if kill_tx.send(reply_tx).is_err() {
            return KillOutcome::NotRunning;
        }

        match reply_rx.await {
            Ok(Ok(())) => KillOutcome::Delivered,
            Ok(Err(e)) => KillOutcome::Failed(e),
            // Supervisor finished before serving the request.
            Err(_) => KillOutcome::NotRunning,
        }
    }
}

impl Drop for LocalCommand {
    fn drop(&mut self) {
        let inner = read_lock(&self.shared);
        if let Some(kill_tx) = inner.state.kill_sender() {
            debug!(
                pid = inner.state.pid(),
                "local command dropped while running; killing process"
            );
            let (reply_tx, _reply_rx) = oneshot::channel();
            let _ = kill_tx.send(reply_tx);
        }
    }
}

impl std::fmt::Debug for LocalCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = read_lock(&self.shared);
        f.debug_struct("LocalCommand")
            .field("config", &inner.config)
            .field("state", &inner.state.tag())
            .field("pid", &inner.state.pid())
            .finish()
    }
}

/// Build the shell invocation for `config`.
fn build_command(config: &CommandConfig) -> Command {
    let mut cmd = Command::new(config.effective_shell());

    if config.script {
        cmd.stdin(Stdio::piped());
    } else {
        cmd.arg("-c").arg(&config.command).stdin(Stdio::null());
    }

    if !config.working_dir.is_empty() {
        cmd.current_dir(&config.working_dir);
    }

    if let Some(pairs) = config.env_pairs() {
        let configured = config.env.as_ref().map_or(0, Vec::len);
        if pairs.len() != configured {
            warn!(
                skipped = configured - pairs.len(),
                "ignoring malformed environment entries"
            );
        }
        cmd.env_clear().envs(pairs);
    }

    cmd
}

fn finish(
    command: String,
    done: std::result::Result<Completion, oneshot::error::RecvError>,
) -> Result<()> {
    let completion = match done {
        Ok(c) => c,
        Err(_) => {
            return Err(LocalCmdError::Wait {
                command,
                source: std::io::Error::other("process supervisor ended without reporting"),
            });
        }
    };

    match completion.status {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => {
            debug!(cmd = %command, killed = completion.killed, %status, "command failed");
            Err(LocalCmdError::ProcessExit { command, status })
        }
        Err(source) => Err(LocalCmdError::Wait { command, source }),
    }
}

pub(crate) fn read_lock(shared: &RwLock<Inner>) -> RwLockReadGuard<'_, Inner> {
    shared.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write_lock(shared: &RwLock<Inner>) -> RwLockWriteGuard<'_, Inner> {
    shared.write().unwrap_or_else(PoisonError::into_inner)
}

fn lock(sinks: &Mutex<OutputSinks>) -> MutexGuard<'_, OutputSinks> {
    sinks.lock().unwrap_or_else(PoisonError::into_inner)
}
