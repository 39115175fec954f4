//! Fake host for behavioural scenarios: a mocked process runner answering
//! from the scenario's reply table, and a diagnostics sink that records.

use std::io;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use dockhand::engine::{
    Diagnostics, JoinOutcome, OutputSink, ProcessHandle, ProcessRunner, ProcessSpec,
};
use mockall::mock;

use super::state::{Replies, Reply, StartLog};

mock! {
    pub Runner {}

    impl ProcessRunner for Runner {
        fn start(
            &self,
            spec: &ProcessSpec,
            stdout: OutputSink,
            stderr: OutputSink,
        ) -> io::Result<Box<dyn ProcessHandle>>;
    }
}

struct FixedHandle {
    outcome: JoinOutcome,
}

impl ProcessHandle for FixedHandle {
    fn join_with_timeout(&mut self, _timeout: Duration) -> io::Result<JoinOutcome> {
        Ok(self.outcome)
    }
}

/// Return the reply-table key for an argument vector.
pub fn reply_key(argv: &[String]) -> String {
    match argv {
        [program, subcommand, ..] if program == "docker" => format!("docker {subcommand}"),
        [program, ..] => program.clone(),
        [] => String::new(),
    }
}

/// Build a runner that records each start and answers from `replies`.
///
/// Programs without a reply cannot be started.
pub fn scripted_runner(replies: Replies, started: StartLog) -> MockRunner {
    let mut runner = MockRunner::new();
    runner.expect_start().returning(move |spec, stdout, stderr| {
        started
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(spec.clone());

        let reply = replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&reply_key(&spec.argv))
            .cloned();

        let outcome = match reply {
            Some(Reply::Exit {
                status,
                stdout: out,
                stderr: err,
            }) => {
                stdout.write(out.as_bytes());
                stderr.write(err.as_bytes());
                JoinOutcome::Exited(status)
            }
            Some(Reply::Hang) => JoinOutcome::TimedOut,
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    "program not found",
                ));
            }
        };
        let handle: Box<dyn ProcessHandle> = Box::new(FixedHandle { outcome });
        Ok(handle)
    });
    runner
}

/// [`Diagnostics`] that keeps every echoed command.
#[derive(Debug, Default)]
pub struct RecordingSink {
    commands: Mutex<Vec<String>>,
    notes: Mutex<Vec<String>>,
}

impl RecordingSink {
    /// Return every echoed command.
    pub fn commands(&self) -> Vec<String> {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Return every operational note.
    pub fn notes(&self) -> Vec<String> {
        self.notes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Diagnostics for RecordingSink {
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
