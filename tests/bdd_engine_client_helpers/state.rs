//! Shared behavioural-test state for engine client scenarios.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use dockhand::engine::{Containment, PathStyle, ProcessSpec, RunRequest};
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;

use super::runner::RecordingSink;

/// Step result type for engine client BDD tests.
pub type StepResult<T> = Result<T, String>;

/// Canned reply of the fake host to one command.
#[derive(Debug, Clone)]
pub enum Reply {
    /// The command exits with `status` after writing the given output.
    Exit {
        /// Exit status.
        status: i32,
        /// Captured standard output.
        stdout: String,
        /// Captured standard error.
        stderr: String,
    },
    /// The command never exits within the timeout.
    Hang,
}

impl Reply {
    /// A successful exit printing `stdout`.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self::Exit {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed exit printing `stderr`.
    pub fn failed(status: i32, stderr: impl Into<String>) -> Self {
        Self::Exit {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Replies keyed by program name, or `docker <subcommand>` for the engine.
pub type Replies = Arc<Mutex<HashMap<String, Reply>>>;

/// Every process the fake host was asked to start.
pub type StartLog = Arc<Mutex<Vec<ProcessSpec>>>;

/// High-level outcome observed after a client operation.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// `run` returned this standard output.
    Stdout(String),
    /// `list_processes` returned these names.
    Processes(Vec<String>),
    /// Containment detection finished.
    Containment(Containment),
    /// `who_am_i` returned this identity.
    Identity(String),
    /// The operation failed.
    Failed {
        /// The failure category.
        kind: FailureKind,
        /// Human-readable error message.
        message: String,
    },
}

/// Categorized failure outcomes for assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The engine exited non-zero.
    EngineCommand,
    /// The process could not be started, joined or finished in time.
    Execution,
    /// Output could not be parsed.
    MalformedOutput,
    /// The request or configuration was invalid.
    Config,
}

/// Shared scenario state for engine client behavioural tests.
#[derive(Default, ScenarioState)]
pub struct EngineClientState {
    /// Path style the client assembles commands for.
    pub(crate) path_style: Slot<PathStyle>,

    /// Request used by the run scenarios.
    pub(crate) request: Slot<RunRequest>,

    /// Replies of the fake host.
    pub(crate) replies: Slot<Replies>,

    /// Processes the fake host was asked to start.
    pub(crate) started: Slot<StartLog>,

    /// Diagnostics emitted by the client.
    pub(crate) diagnostics: Slot<Arc<RecordingSink>>,

    /// Outcome of the most recent operation.
    pub(crate) outcome: Slot<Outcome>,
}

/// Fixture providing fresh state for each engine client scenario.
#[fixture]
pub fn engine_client_state() -> EngineClientState {
    let state = EngineClientState::default();
    state.path_style.set(PathStyle::Posix);
    state.replies.set(Arc::new(Mutex::new(HashMap::new())));
    state.started.set(Arc::new(Mutex::new(Vec::new())));
    state.diagnostics.set(Arc::new(RecordingSink::default()));
    state
}
