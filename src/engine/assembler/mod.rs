//! Argument assembly for each supported engine operation.
//!
//! Every path-bearing value is translated exactly once here, and container
//! environment entries are pushed as masked arguments.

use super::command::CommandLine;
use super::path::PathStyle;
use super::request::RunRequest;
use super::tokenize::split_words;

const INSPECT_ID_FORMAT: &str = "--format={{.Id}}";

/// Builds engine command lines for one engine binary and path style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentAssembler {
    engine: String,
    path_style: PathStyle,
}

impl ArgumentAssembler {
    /// Create an assembler for `engine` (for example `docker`).
    #[must_use]
    pub fn new(engine: impl Into<String>, path_style: PathStyle) -> Self {
        Self {
            engine: engine.into(),
            path_style,
        }
    }

    /// Return the engine binary.
    #[must_use]
    pub fn engine(&self) -> &str {
        &self.engine
    }

    /// Return the path style applied to path-bearing values.
    #[must_use]
    pub const fn path_style(&self) -> PathStyle {
        self.path_style
    }

    /// Assemble `run -d -t ...` for a detached container with a pseudo-terminal.
    #[must_use]
    pub fn run(&self, request: &RunRequest) -> CommandLine {
        let mut command = CommandLine::new(self.engine.as_str()).args(["run", "-d", "-t"]);

        if self.path_style == PathStyle::Posix && !request.user().is_empty() {
            command.push("-u");
            command.push(request.user());
        }

        if let Some(extra) = request.extra_args() {
            for word in split_words(extra) {
                command.push(word);
            }
        }

        if let Some(workdir) = request.workdir() {
            command.push("-w");
            command.push(self.path_style.translate(workdir).into_string());
        }

        for (host, container) in request.volumes() {
            let host_path = self.path_style.translate(host);
            let container_path = self.path_style.translate(container);
            command.push("-v");
            command.push(format!("{host_path}:{container_path}"));
        }

        for container_id in request.volumes_from() {
            command.push("--volumes-from");
            command.push(container_id.as_str());
        }

        for (name, value) in request.container_env() {
            command.push("-e");
            command.push_masked(format!("{name}={value}"));
        }

        command.push(request.image());
        for token in request.command() {
            command.push(token.as_str());
        }
        command
    }

    /// Assemble `top <container>`.
    #[must_use]
    pub fn top(&self, container_id: &str) -> CommandLine {
        self.engine_command(&["top", container_id])
    }

    /// Assemble `inspect <name> --format={{.Id}}`.
    #[must_use]
    pub fn inspect_id(&self, name: &str) -> CommandLine {
        self.engine_command(&["inspect", name, INSPECT_ID_FORMAT])
    }

    /// Assemble an engine invocation from literal tokens.
    #[must_use]
    pub fn engine_command(&self, tokens: &[&str]) -> CommandLine {
        self.ad_hoc(&self.engine, tokens)
    }

    /// Assemble an arbitrary host command.
    ///
    /// Every token after the program is passed through the path translator;
    /// the program itself is kept verbatim.
    #[must_use]
    pub fn ad_hoc(&self, program: &str, tokens: &[&str]) -> CommandLine {
        CommandLine::new(program).args(
            tokens
                .iter()
                .map(|token| self.path_style.translate(token).into_string()),
        )
    }
}
