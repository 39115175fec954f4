//! Semantic error types for dockhand.
//!
//! Conditions a caller might inspect or react to are modelled as `thiserror`
//! enums grouped by concern. Opaque reporting (`eyre::Report`) is reserved for
//! the binary boundary.

use std::sync::Arc;

use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be parsed.
    #[error("failed to parse configuration file: {message}")]
    ParseError {
        /// A description of the parse error.
        message: String,
    },

    /// A required configuration value is missing.
    #[error("missing required configuration: {field}")]
    MissingRequired {
        /// The name of the missing field.
        field: String,
    },

    /// A configuration value failed validation.
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// The name of the invalid field.
        field: String,
        /// The reason the value is invalid.
        reason: String,
    },

    /// The `OrthoConfig` library returned an error while merging layers.
    #[error("configuration loading failed: {0}")]
    OrthoConfig(Arc<ortho_config::OrthoError>),
}

/// Errors raised when an external process cannot be run to completion.
///
/// None of these carry a partial result: a process that could not be started,
/// joined, or that outlived the client timeout produces no captured output.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The process runner could not start the process.
    #[error("failed to start '{program}': {message}")]
    SpawnFailed {
        /// The program that failed to start.
        program: String,
        /// A description of the start failure.
        message: String,
    },

    /// The process started but could not be waited on.
    #[error("failed to wait for '{program}': {message}")]
    JoinFailed {
        /// The program being waited on.
        program: String,
        /// A description of the wait failure.
        message: String,
    },

    /// The process did not exit within the client timeout.
    #[error("'{program}' did not exit within {seconds} seconds")]
    Timeout {
        /// The program that timed out.
        program: String,
        /// The timeout that elapsed, in seconds.
        seconds: u64,
    },

    /// The async runtime backing the process runner could not be created.
    #[error("failed to create process runtime: {message}")]
    RuntimeCreationFailed {
        /// A description of the runtime failure.
        message: String,
    },

    /// The host claims to be containerized but its short name could not be
    /// resolved.
    #[error("failed to resolve host identity: {reason}")]
    HostIdentityUnresolved {
        /// Why the hostname query failed.
        reason: String,
    },
}

/// Errors reported when an engine command ran and exited non-zero.
#[derive(Debug, Error)]
pub enum EngineError {
    /// `run` exited with a non-zero status.
    #[error("failed to run image '{image}': {stderr}")]
    RunFailed {
        /// The image that was requested.
        image: String,
        /// Captured standard error.
        stderr: String,
    },

    /// `top` exited with a non-zero status.
    #[error("failed to list processes of container '{container_id}': {stderr}")]
    TopFailed {
        /// The container whose processes were requested.
        container_id: String,
        /// Captured standard error.
        stderr: String,
    },

    /// A fixed host command exited with a non-zero status.
    #[error("'{command}' exited with status {status}: {stderr}")]
    CommandFailed {
        /// The command that was run.
        command: String,
        /// The exit status.
        status: i32,
        /// Captured standard error.
        stderr: String,
    },
}

/// Errors raised when a successful command printed something unexpected.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Standard output could not be parsed into the expected shape.
    #[error("unexpected engine output: {raw:?}")]
    Malformed {
        /// The offending raw text.
        raw: String,
    },
}

/// Top-level error type for dockhand.
#[derive(Debug, Error)]
pub enum DockhandError {
    /// An error occurred during configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An external process could not be run to completion.
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// An engine command exited with a non-zero status.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Command output could not be parsed.
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// A specialised `Result` type for dockhand operations.
pub type Result<T> = std::result::Result<T, DockhandError>;
