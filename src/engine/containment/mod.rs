//! Best-effort detection of whether this host is itself a container.
//!
//! The protocol runs at most three commands, in order, stopping at the first
//! negative signal:
//!
//! 1. A host-service query that only succeeds inside a container. Any failure
//!    here means "not containerized".
//! 2. A hostname query. Failure here is an operational error, since the host
//!    has already claimed to be containerized.
//! 3. An engine lookup of the lower-cased hostname's long identifier. A
//!    non-zero exit means the host is not a container this engine knows.

use super::assembler::ArgumentAssembler;
use super::executor::{Executor, LaunchEnv, ProcessRunner};
use super::parse::parse_identifier;
use super::path::PathStyle;
use crate::error::{DockhandError, ExecutionError};

/// Result of containment detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Containment {
    /// The host is not (known to be) a container.
    Absent,
    /// The host is the container with this long identifier.
    Present {
        /// The engine's long-form container identifier.
        container_id: String,
    },
}

impl Containment {
    /// Return the container identifier, if present.
    #[must_use]
    pub fn container_id(&self) -> Option<&str> {
        match self {
            Self::Absent => None,
            Self::Present { container_id } => Some(container_id),
        }
    }
}

/// Host commands used by the first two protocol steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainmentProbe {
    service_program: String,
    service_args: Vec<String>,
    hostname_program: String,
}

impl ContainmentProbe {
    /// Create a probe from explicit commands.
    #[must_use]
    pub fn new(
        service_program: impl Into<String>,
        service_args: Vec<String>,
        hostname_program: impl Into<String>,
    ) -> Self {
        Self {
            service_program: service_program.into(),
            service_args,
            hostname_program: hostname_program.into(),
        }
    }

    /// Return the probe matching a host path style.
    ///
    /// Windows containers run the `cexecsvc` service; elsewhere
    /// `systemd-detect-virt --container` exits zero inside a container.
    #[must_use]
    pub fn for_style(style: PathStyle) -> Self {
        match style {
            PathStyle::Windows => Self::new(
                "sc.exe",
                vec![String::from("query"), String::from("cexecsvc")],
                "hostname",
            ),
            PathStyle::Posix => Self::new(
                "systemd-detect-virt",
                vec![String::from("--container")],
                "hostname",
            ),
        }
    }
}

/// Runs the containment protocol over an [`Executor`].
pub struct ContainmentDetector<'a, R> {
    executor: &'a Executor<R>,
    assembler: &'a ArgumentAssembler,
    probe: &'a ContainmentProbe,
    engine_env: Option<&'a LaunchEnv>,
}

impl<'a, R: ProcessRunner> ContainmentDetector<'a, R> {
    /// Create a detector borrowing the client's collaborators.
    #[must_use]
    pub const fn new(
        executor: &'a Executor<R>,
        assembler: &'a ArgumentAssembler,
        probe: &'a ContainmentProbe,
    ) -> Self {
        Self {
            executor,
            assembler,
            probe,
            engine_env: None,
        }
    }

    /// Use `engine_env` for the engine identifier lookup.
    ///
    /// Host probe steps always run with an empty environment.
    #[must_use]
    pub const fn with_engine_env(mut self, engine_env: &'a LaunchEnv) -> Self {
        self.engine_env = Some(engine_env);
        self
    }

    /// Decide whether this host is a container and recover its identifier.
    ///
    /// # Errors
    ///
    /// Returns `ExecutionError::HostIdentityUnresolved` when the hostname
    /// query fails after a positive service probe, and propagates executor
    /// failures from the identifier lookup.
    pub fn detect(&self) -> Result<Containment, DockhandError> {
        if !self.service_probe_succeeds() {
            return Ok(Containment::Absent);
        }

        let short_name = self.short_host_name()?;
        let no_env = LaunchEnv::new();
        let lookup = self.executor.execute(
            self.engine_env.unwrap_or(&no_env),
            true,
            None,
            &self.assembler.inspect_id(&short_name),
        )?;
        if !lookup.is_success() {
            self.executor.diagnostics().note(
                "running inside a container but cannot determine the container id from the current environment",
            );
            return Ok(Containment::Absent);
        }

        match parse_identifier(lookup.stdout()) {
            Ok(container_id) => Ok(Containment::Present { container_id }),
            Err(error) => {
                self.executor
                    .diagnostics()
                    .note(&format!("ignoring container id lookup result: {error}"));
                Ok(Containment::Absent)
            }
        }
    }

    fn service_probe_succeeds(&self) -> bool {
        let args: Vec<&str> = self
            .probe
            .service_args
            .iter()
            .map(String::as_str)
            .collect();
        let command = self
            .assembler
            .ad_hoc(&self.probe.service_program, &args);
        self.executor
            .execute(&LaunchEnv::new(), true, None, &command)
            .is_ok_and(|result| result.is_success())
    }

    fn short_host_name(&self) -> Result<String, DockhandError> {
        let command = self.assembler.ad_hoc(&self.probe.hostname_program, &[]);
        let result = self
            .executor
            .execute(&LaunchEnv::new(), true, None, &command)
            .map_err(|error| unresolved(error.to_string()))?;
        if !result.is_success() {
            return Err(unresolved(format!(
                "hostname exited with status {}: {}",
                result.status(),
                result.stderr().trim()
            )));
        }

        let name = result.stdout().trim().to_lowercase();
        if name.is_empty() {
            return Err(unresolved(String::from("hostname printed nothing")));
        }
        Ok(name)
    }
}

fn unresolved(reason: String) -> DockhandError {
    DockhandError::from(ExecutionError::HostIdentityUnresolved { reason })
}
