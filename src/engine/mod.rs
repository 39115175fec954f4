//! Container engine command-line client.
//!
//! Commands are assembled as argument vectors, executed through a
//! [`ProcessRunner`] under a fixed timeout, and their text output parsed into
//! typed results. The pieces compose into [`EngineClient`]:
//!
//! 1. [`PathStyle`] translates host paths for the engine CLI
//! 2. [`ArgumentAssembler`] builds [`CommandLine`]s, masking secrets
//! 3. [`Executor`] runs them and captures output
//! 4. [`parse_process_list`] and [`parse_identifier`] read the output
//! 5. [`ContainmentDetector`] decides whether this host is a container

mod assembler;
mod client;
mod command;
mod containment;
mod executor;
mod launch_env;
mod parse;
mod path;
mod request;
mod tokenize;

#[cfg(test)]
pub(crate) mod test_support;

pub use assembler::ArgumentAssembler;
pub use client::EngineClient;
pub use command::{Arg, CommandLine, MASK_PLACEHOLDER};
pub use containment::{Containment, ContainmentDetector, ContainmentProbe};
pub use executor::{
    DEFAULT_TIMEOUT_SECS, Diagnostics, Executor, JoinOutcome, LaunchEnv, LaunchResult,
    OutputSink, ProcessHandle, ProcessRunner, ProcessSpec, TokioProcessRunner,
    TracingDiagnostics,
};
pub use launch_env::{ENGINE_ENV_VARS, ENGINE_HOST_VAR, LaunchEnvResolver};
pub use parse::{parse_identifier, parse_process_list};
pub use path::{EnginePath, PathStyle};
pub use request::RunRequest;
pub use tokenize::split_words;
