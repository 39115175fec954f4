//! Default [`ProcessRunner`] backed by `tokio::process`.
//!
//! Output pipes are drained on the runtime while the caller blocks on the
//! join, so a chatty process cannot stall on a full pipe.

use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::runtime::{Handle, Runtime};
use tokio::task::JoinHandle;

use super::{JoinOutcome, OutputSink, ProcessHandle, ProcessRunner, ProcessSpec};
use crate::error::{DockhandError, ExecutionError};

/// Status reported for a process that ended without an exit code.
const SIGNALLED_STATUS: i32 = -1;

/// Runs processes on a dedicated tokio runtime.
///
/// The blocking join must not be called from within an async context.
pub struct TokioProcessRunner {
    runtime: Runtime,
}

impl TokioProcessRunner {
    /// Create a runner with its own multi-threaded runtime.
    ///
    /// # Errors
    ///
    /// Returns `ExecutionError::RuntimeCreationFailed` if the runtime cannot
    /// be built.
    pub fn new() -> Result<Self, DockhandError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .map_err(|e| {
                DockhandError::from(ExecutionError::RuntimeCreationFailed {
                    message: e.to_string(),
                })
            })?;
        Ok(Self { runtime })
    }
}

impl ProcessRunner for TokioProcessRunner {
    fn start(
        &self,
        spec: &ProcessSpec,
        stdout: OutputSink,
        stderr: OutputSink,
    ) -> io::Result<Box<dyn ProcessHandle>> {
        let Some((program, args)) = spec.argv.split_first() else {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "empty argv"));
        };

        let mut command = Command::new(program);
        command
            .args(args)
            .envs(&spec.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(ref dir) = spec.workdir {
            command.current_dir(dir);
        }

        let handle = self.runtime.handle().clone();
        let mut child = {
            let _context = handle.enter();
            command.spawn()?
        };

        let mut pumps = Vec::with_capacity(2);
        if let Some(pipe) = child.stdout.take() {
            pumps.push(handle.spawn(drain(pipe, stdout)));
        }
        if let Some(pipe) = child.stderr.take() {
            pumps.push(handle.spawn(drain(pipe, stderr)));
        }

        Ok(Box::new(TokioProcessHandle {
            handle,
            child,
            pumps,
        }))
    }
}

struct TokioProcessHandle {
    handle: Handle,
    child: Child,
    pumps: Vec<JoinHandle<io::Result<()>>>,
}

impl ProcessHandle for TokioProcessHandle {
    fn join_with_timeout(&mut self, timeout: Duration) -> io::Result<JoinOutcome> {
        let handle = self.handle.clone();
        handle.block_on(wait_with_timeout(&mut self.child, &mut self.pumps, timeout))
    }
}

async fn wait_with_timeout(
    child: &mut Child,
    pumps: &mut Vec<JoinHandle<io::Result<()>>>,
    timeout: Duration,
) -> io::Result<JoinOutcome> {
    // The deadline covers the output pipes too: a detached grandchild can
    // hold them open after the direct child exits.
    let finished = tokio::time::timeout(timeout, wait_and_collect(child, pumps)).await;
    match finished {
        Ok(status) => Ok(JoinOutcome::Exited(exit_code(status?))),
        Err(_elapsed) => {
            if matches!(child.try_wait(), Ok(None))
                && let Err(error) = child.start_kill()
            {
                tracing::warn!(%error, "failed to kill timed-out process");
            }
            for pump in pumps.drain(..) {
                pump.abort();
            }
            Ok(JoinOutcome::TimedOut)
        }
    }
}

async fn wait_and_collect(
    child: &mut Child,
    pumps: &mut Vec<JoinHandle<io::Result<()>>>,
) -> io::Result<ExitStatus> {
    let status = child.wait().await?;
    for pump in pumps.iter_mut() {
        pump.await.map_err(io::Error::other)??;
    }
    pumps.clear();
    Ok(status)
}

async fn drain<P>(mut pipe: P, sink: OutputSink) -> io::Result<()>
where
    P: AsyncRead + Unpin,
{
    let mut buffer = Vec::new();
    pipe.read_to_end(&mut buffer).await?;
    sink.write(&buffer);
    Ok(())
}

fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(SIGNALLED_STATUS)
}
