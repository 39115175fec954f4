//! Synchronous client for a container engine's command-line tool.
//!
//! `dockhand` drives an engine CLI such as `docker` as a subprocess rather
//! than talking to its API socket. Every operation assembles an argument
//! vector, runs it under a fixed timeout and parses the captured text.
//!
//! # Operations
//!
//! - start a detached container from a [`engine::RunRequest`]
//! - list the processes of a running container
//! - detect whether the current host is itself a container
//! - query the identity of the invoking user
//!
//! Container environment values are passed to the engine in full but are
//! redacted wherever a command is logged or debug-printed.
//!
//! # Modules
//!
//! - [`config`]: Layered configuration (CLI > env > file > defaults)
//! - [`engine`]: Command assembly, execution and output parsing
//! - [`error`]: Semantic error types for the library

pub mod config;
pub mod engine;
pub mod error;
