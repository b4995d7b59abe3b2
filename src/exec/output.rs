// src/exec/output.rs

//! Byte pumps between the child's standard streams and caller-supplied sinks.
//!
//! Every pump is a fire-and-forget Tokio task. Output pumps end when the
//! child (and anything it forked that kept the pipe) closes its end; the
//! stdin pump ends after writing the script body and closing the pipe.

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::process::ChildStdin;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Destination for one of the child's output streams.
pub type OutputSink = Box<dyn AsyncWrite + Send + Unpin>;

/// Sinks handed to the executor before start.
#[derive(Default)]
pub(crate) struct OutputSinks {
    pub(crate) stdout: Option<OutputSink>,
    pub(crate) stderr: Option<OutputSink>,
}

/// Copy everything from `source` into `sink`, flushing at the end.
pub(crate) fn spawn_output_pump<R>(
    stream: &'static str,
    pid: u32,
    mut source: R,
    mut sink: OutputSink,
) -> JoinHandle<()>
where
    R: AsyncRead + Send + Unpin + 'static,
{
    tokio::spawn(async move {
        match tokio::io::copy(&mut source, &mut sink).await {
            Ok(bytes) => trace!(pid, stream, bytes, "output pump finished"),
            Err(e) => debug!(pid, stream, error = %e, "output pump stopped early"),
        }
        if let Err(e) = sink.flush().await {
            debug!(pid, stream, error = %e, "flushing output sink failed");
        }
    })
}

/// Write the script body to the child's stdin, then close it so the shell
/// sees end-of-input.
pub(crate) fn spawn_stdin_pump(pid: u32, mut stdin: ChildStdin, script: String) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = stdin.write_all(script.as_bytes()).await {
            // The shell may exit before reading the whole script.
            debug!(pid, error = %e, "writing script to stdin failed");
            return;
        }
        if let Err(e) = stdin.shutdown().await {
            debug!(pid, error = %e, "closing stdin failed");
        }
        trace!(pid, "script delivered on stdin");
    })
}
