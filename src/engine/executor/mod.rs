//! Bounded execution of external commands.
//!
//! The [`Executor`] hands an assembled [`CommandLine`] to a [`ProcessRunner`],
//! waits for it under a fixed timeout and normalises the outcome into a
//! [`LaunchResult`]. Process creation itself sits behind the runner trait so
//! the rest of the client is testable without spawning anything.

mod tokio_runner;

use std::collections::BTreeMap;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};

use super::command::CommandLine;
use crate::error::{DockhandError, ExecutionError};

pub use tokio_runner::TokioProcessRunner;

/// Timeout in seconds applied to every external command.
pub const DEFAULT_TIMEOUT_SECS: u64 = 180;

/// Environment handed to a process, merged over the inherited environment.
pub type LaunchEnv = BTreeMap<String, String>;

/// Everything a runner needs to start a process.
#[derive(Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    /// Program followed by its arguments.
    pub argv: Vec<String>,
    /// Extra environment variables.
    pub env: LaunchEnv,
    /// Working directory for the process, if not the current one.
    pub workdir: Option<Utf8PathBuf>,
}

impl std::fmt::Debug for ProcessSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // argv may hold masked values; only its length is shown.
        f.debug_struct("ProcessSpec")
            .field("program", &self.argv.first())
            .field("arg_count", &self.argv.len())
            .field("env", &self.env.keys().collect::<Vec<_>>())
            .field("workdir", &self.workdir)
            .finish()
    }
}

/// A shared byte buffer that a runner writes captured output into.
#[derive(Debug, Clone, Default)]
pub struct OutputSink {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl OutputSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes to the sink.
    pub fn write(&self, bytes: &[u8]) {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(bytes);
    }

    /// Decode the captured bytes, replacing invalid sequences.
    #[must_use]
    pub fn text(&self) -> String {
        let buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

/// How a wait on a started process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The process exited with the given status.
    Exited(i32),
    /// The timeout elapsed first.
    TimedOut,
}

/// A process started by a [`ProcessRunner`].
pub trait ProcessHandle {
    /// Block until the process exits or `timeout` elapses.
    ///
    /// Captured output must be fully written to the sinks before this
    /// returns [`JoinOutcome::Exited`].
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the process cannot be waited on.
    fn join_with_timeout(&mut self, timeout: Duration) -> io::Result<JoinOutcome>;
}

/// Starts processes on behalf of the [`Executor`].
///
/// Implementations own process creation and I/O plumbing; the executor owns
/// the argument vector, environment, working directory and output sinks.
pub trait ProcessRunner {
    /// Start a process, routing its output into the given sinks.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the process cannot be started at all.
    fn start(
        &self,
        spec: &ProcessSpec,
        stdout: OutputSink,
        stderr: OutputSink,
    ) -> io::Result<Box<dyn ProcessHandle>>;
}

/// Receives diagnostic output from the executor.
///
/// Only the redacted rendering of a command is ever passed in.
pub trait Diagnostics: Send + Sync {
    /// Record a command about to be executed.
    fn command(&self, rendered: &str);

    /// Record an operational note.
    fn note(&self, message: &str);
}

/// [`Diagnostics`] backed by `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn command(&self, rendered: &str) {
        tracing::debug!(command = %rendered, "executing command");
    }

    fn note(&self, message: &str) {
        tracing::info!("{message}");
    }
}

/// Exit status and captured output of one finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchResult {
    status: i32,
    stdout: String,
    stderr: String,
}

impl LaunchResult {
    /// Create a result from its parts.
    #[must_use]
    pub const fn new(status: i32, stdout: String, stderr: String) -> Self {
        Self {
            status,
            stdout,
            stderr,
        }
    }

    /// Return the exit status.
    #[must_use]
    pub const fn status(&self) -> i32 {
        self.status
    }

    /// Return whether the process exited with status zero.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status == 0
    }

    /// Return captured standard output.
    #[must_use]
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    /// Return captured standard error.
    #[must_use]
    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    /// Consume the result and return captured standard output.
    #[must_use]
    pub fn into_stdout(self) -> String {
        self.stdout
    }
}

/// Runs command lines through a [`ProcessRunner`] under a fixed timeout.
pub struct Executor<R> {
    runner: R,
    timeout: Duration,
    diagnostics: Arc<dyn Diagnostics>,
}

impl<R: ProcessRunner> Executor<R> {
    /// Create an executor with the default timeout.
    #[must_use]
    pub fn new(runner: R, diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self {
            runner,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            diagnostics,
        }
    }

    /// Override the timeout applied to every command.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Return the timeout applied to every command.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Return the diagnostics sink.
    #[must_use]
    pub fn diagnostics(&self) -> &dyn Diagnostics {
        self.diagnostics.as_ref()
    }

    /// Run `command` to completion.
    ///
    /// Unless `quiet` is set, the redacted command is echoed to the
    /// diagnostics sink first. A non-zero exit is a normal result.
    ///
    /// # Errors
    ///
    /// Returns `ExecutionError::SpawnFailed` when the process cannot be
    /// started, `ExecutionError::JoinFailed` when it cannot be waited on and
    /// `ExecutionError::Timeout` when it outlives the timeout.
    pub fn execute(
        &self,
        env: &LaunchEnv,
        quiet: bool,
        workdir: Option<&Utf8Path>,
        command: &CommandLine,
    ) -> Result<LaunchResult, DockhandError> {
        if !quiet {
            self.diagnostics.command(&command.to_string());
        }

        let program = command.program();
        if program.is_empty() {
            return Err(DockhandError::from(ExecutionError::SpawnFailed {
                program: String::new(),
                message: String::from("empty command line"),
            }));
        }

        let spec = ProcessSpec {
            argv: command.to_argv(),
            env: env.clone(),
            workdir: workdir.map(Utf8Path::to_path_buf),
        };
        let stdout = OutputSink::new();
        let stderr = OutputSink::new();

        let mut handle = self
            .runner
            .start(&spec, stdout.clone(), stderr.clone())
            .map_err(|e| {
                DockhandError::from(ExecutionError::SpawnFailed {
                    program: String::from(program),
                    message: e.to_string(),
                })
            })?;

        let outcome = handle.join_with_timeout(self.timeout).map_err(|e| {
            DockhandError::from(ExecutionError::JoinFailed {
                program: String::from(program),
                message: e.to_string(),
            })
        })?;

        match outcome {
            JoinOutcome::Exited(status) => {
                Ok(LaunchResult::new(status, stdout.text(), stderr.text()))
            }
            JoinOutcome::TimedOut => Err(DockhandError::from(ExecutionError::Timeout {
                program: String::from(program),
                seconds: self.timeout.as_secs(),
            })),
        }
    }
}
