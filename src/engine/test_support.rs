//! Shared doubles for engine unit tests.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use mockall::mock;

use super::executor::{
    Diagnostics, JoinOutcome, OutputSink, ProcessHandle, ProcessRunner, ProcessSpec,
};

mock! {
    pub(crate) Runner {}

    impl ProcessRunner for Runner {
        fn start(
            &self,
            spec: &ProcessSpec,
            stdout: OutputSink,
            stderr: OutputSink,
        ) -> io::Result<Box<dyn ProcessHandle>>;
    }
}

/// Canned behaviour for one process start.
#[derive(Debug, Clone)]
pub(crate) enum Scripted {
    /// The process exits with `status` after writing the given output.
    Exit {
        status: i32,
        stdout: &'static str,
        stderr: &'static str,
    },
    /// The process outlives the timeout.
    TimedOut,
    /// The runner cannot start the process.
    StartFails,
    /// The process starts but cannot be waited on.
    JoinFails,
}

impl Scripted {
    pub(crate) const fn ok(stdout: &'static str) -> Self {
        Self::Exit {
            status: 0,
            stdout,
            stderr: "",
        }
    }

    pub(crate) const fn failed(status: i32, stderr: &'static str) -> Self {
        Self::Exit {
            status,
            stdout: "",
            stderr,
        }
    }
}

struct FixedHandle {
    outcome: Option<JoinOutcome>,
}

impl ProcessHandle for FixedHandle {
    fn join_with_timeout(&mut self, _timeout: Duration) -> io::Result<JoinOutcome> {
        self.outcome
            .ok_or_else(|| io::Error::other("wait interrupted"))
    }
}

/// Every process spec a scripted runner was asked to start.
pub(crate) type StartLog = Arc<Mutex<Vec<ProcessSpec>>>;

/// Build a runner that answers each start with `script(argv)`.
pub(crate) fn scripted_runner<F>(script: F) -> (MockRunner, StartLog)
where
    F: Fn(&[String]) -> Scripted + Send + 'static,
{
    let log: StartLog = Arc::new(Mutex::new(Vec::new()));
    let log_for_closure = Arc::clone(&log);
    let mut runner = MockRunner::new();

    runner
        .expect_start()
        .returning(move |spec, stdout, stderr| {
            log_for_closure
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(spec.clone());

            let outcome = match script(spec.argv.as_slice()) {
                Scripted::Exit {
                    status,
                    stdout: out,
                    stderr: err,
                } => {
                    stdout.write(out.as_bytes());
                    stderr.write(err.as_bytes());
                    Some(JoinOutcome::Exited(status))
                }
                Scripted::TimedOut => Some(JoinOutcome::TimedOut),
                Scripted::StartFails => {
                    return Err(io::Error::new(
                        io::ErrorKind::NotFound,
                        "program not found",
                    ));
                }
                Scripted::JoinFails => None,
            };
            let handle: Box<dyn ProcessHandle> = Box::new(FixedHandle { outcome });
            Ok(handle)
        });

    (runner, log)
}

/// Return the argv of every recorded start.
pub(crate) fn started_argvs(log: &StartLog) -> Vec<Vec<String>> {
    log.lock()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .map(|spec| spec.argv.clone())
        .collect()
}

/// Return every recorded start.
pub(crate) fn started_specs(log: &StartLog) -> Vec<ProcessSpec> {
    log.lock().unwrap_or_else(PoisonError::into_inner).clone()
}

/// [`Diagnostics`] that keeps everything it is told.
#[derive(Debug, Default)]
pub(crate) struct RecordingDiagnostics {
    commands: Mutex<Vec<String>>,
    notes: Mutex<Vec<String>>,
}

impl RecordingDiagnostics {
    pub(crate) fn commands(&self) -> Vec<String> {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn notes(&self) -> Vec<String> {
        self.notes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn command(&self, rendered: &str) {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(String::from(rendered));
    }

    fn note(&self, message: &str) {
        self.notes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(String::from(message));
    }
}
