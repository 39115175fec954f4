//! Facade over the engine command-line client.
//!
//! [`EngineClient`] composes the assembler, executor, output parser and
//! containment detector into the four public operations.

use std::sync::Arc;
use std::time::Duration;

use super::assembler::ArgumentAssembler;
use super::containment::{Containment, ContainmentDetector, ContainmentProbe};
use super::executor::{Diagnostics, Executor, LaunchEnv, ProcessRunner};
use super::parse::parse_process_list;
use super::request::RunRequest;
use crate::error::{DockhandError, EngineError};

const WHOAMI_PROGRAM: &str = "whoami";

/// Issues engine commands on behalf of callers.
///
/// Each operation is an independent, synchronous sequence of blocking
/// executions. The client holds no state that changes between calls.
pub struct EngineClient<R> {
    executor: Executor<R>,
    assembler: ArgumentAssembler,
    probe: ContainmentProbe,
    launch_env: LaunchEnv,
}

impl<R: ProcessRunner> EngineClient<R> {
    /// Create a client.
    ///
    /// The containment probe follows the assembler's path style, and engine
    /// commands start with an empty launch environment.
    #[must_use]
    pub fn new(
        runner: R,
        assembler: ArgumentAssembler,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        let probe = ContainmentProbe::for_style(assembler.path_style());
        Self {
            executor: Executor::new(runner, diagnostics),
            assembler,
            probe,
            launch_env: LaunchEnv::new(),
        }
    }

    /// Override the timeout applied to every command.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.executor = self.executor.with_timeout(timeout);
        self
    }

    /// Set the environment passed to `run` and `top`.
    #[must_use]
    pub fn with_launch_env(mut self, launch_env: LaunchEnv) -> Self {
        self.launch_env = launch_env;
        self
    }

    /// Replace the containment probe commands.
    #[must_use]
    pub fn with_probe(mut self, probe: ContainmentProbe) -> Self {
        self.probe = probe;
        self
    }

    /// Return the argument assembler.
    #[must_use]
    pub const fn assembler(&self) -> &ArgumentAssembler {
        &self.assembler
    }

    /// Return the executor.
    #[must_use]
    pub const fn executor(&self) -> &Executor<R> {
        &self.executor
    }

    /// Start a detached container and return the engine's standard output,
    /// normally the new container's identifier.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::RunFailed` on a non-zero exit, and execution
    /// errors when the engine cannot be started or times out.
    pub fn run(&self, request: &RunRequest) -> Result<String, DockhandError> {
        let command = self.assembler.run(request);
        let result = self
            .executor
            .execute(&self.launch_env, false, None, &command)?;
        if !result.is_success() {
            return Err(EngineError::RunFailed {
                image: String::from(request.image()),
                stderr: String::from(result.stderr()),
            }
            .into());
        }
        Ok(result.into_stdout())
    }

    /// List the command names of processes running in a container.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::TopFailed` on a non-zero exit,
    /// `OutputError::Malformed` when the listing cannot be parsed, and
    /// execution errors when the engine cannot be started or times out.
    pub fn list_processes(&self, container_id: &str) -> Result<Vec<String>, DockhandError> {
        let command = self.assembler.top(container_id);
        let result = self
            .executor
            .execute(&self.launch_env, false, None, &command)?;
        if !result.is_success() {
            return Err(EngineError::TopFailed {
                container_id: String::from(container_id),
                stderr: String::from(result.stderr()),
            }
            .into());
        }
        parse_process_list(result.stdout())
    }

    /// Detect whether this host is a container and return its identifier.
    ///
    /// # Errors
    ///
    /// Returns `ExecutionError::HostIdentityUnresolved` when the host claims
    /// to be a container but its hostname cannot be read.
    pub fn container_id_if_containerized(&self) -> Result<Containment, DockhandError> {
        ContainmentDetector::new(&self.executor, &self.assembler, &self.probe)
            .with_engine_env(&self.launch_env)
            .detect()
    }

    /// Return the name of the user running this process.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::CommandFailed` on a non-zero exit, and execution
    /// errors unchanged.
    pub fn who_am_i(&self) -> Result<String, DockhandError> {
        let command = self.assembler.ad_hoc(WHOAMI_PROGRAM, &[]);
        let result = self
            .executor
            .execute(&LaunchEnv::new(), true, None, &command)?;
        if !result.is_success() {
            return Err(EngineError::CommandFailed {
                command: String::from(WHOAMI_PROGRAM),
                status: result.status(),
                stderr: String::from(result.stderr()),
            }
            .into());
        }
        Ok(String::from(result.stdout().trim()))
    }
}
