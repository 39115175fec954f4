//! Command-line argument definitions for dockhand.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

use crate::engine::{PathStyle, RunRequest};
use crate::error::Result;

/// Command-line interface for dockhand.
#[derive(Debug, Parser)]
#[command(name = "dockhand")]
#[command(author, version, about = "Drive a container engine through its CLI")]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file.
    #[arg(long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Engine endpoint passed to the engine CLI as `DOCKER_HOST`.
    #[arg(long, global = true)]
    pub engine_host: Option<String>,

    /// Engine binary name or path.
    #[arg(long = "engine", global = true)]
    pub engine_binary: Option<String>,

    /// Path syntax the engine CLI expects.
    #[arg(long, global = true, value_enum)]
    pub path_style: Option<PathStyle>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start a detached container and print its identifier.
    Run(RunArgs),

    /// List the processes running in a container.
    Top(TopArgs),

    /// Print the name of the invoking user.
    Whoami,

    /// Print this host's container identifier, if it is a container.
    Containerized,
}

/// Arguments for the `run` subcommand.
#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Image to start.
    #[arg(long, required = true)]
    pub image: String,

    /// Extra engine arguments, split like a shell would.
    #[arg(long, allow_hyphen_values = true)]
    pub args: Option<String>,

    /// Working directory inside the container.
    #[arg(long)]
    pub workdir: Option<String>,

    /// Bind mount as `HOST=CONTAINER`.
    #[arg(long = "volume", value_parser = parse_pair)]
    pub volumes: Vec<(String, String)>,

    /// Container whose volumes are mounted.
    #[arg(long = "volumes-from")]
    pub volumes_from: Vec<String>,

    /// Container environment entry as `NAME=VALUE`.
    #[arg(long = "env", value_parser = parse_pair)]
    pub env: Vec<(String, String)>,

    /// User to run as inside the container.
    #[arg(long)]
    pub user: Option<String>,

    /// Command to run in the container.
    #[arg(last = true)]
    pub command: Vec<String>,
}

impl RunArgs {
    /// Convert the arguments into a [`RunRequest`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingRequired` when the image is blank.
    pub fn to_request(&self) -> Result<RunRequest> {
        let mut request = RunRequest::new(self.image.as_str())?
            .with_extra_args(self.args.clone())
            .with_workdir(self.workdir.clone())
            .with_command(self.command.clone());
        for (host, container) in &self.volumes {
            request = request.with_volume(host.as_str(), container.as_str());
        }
        for container_id in &self.volumes_from {
            request = request.with_volumes_from(container_id.as_str());
        }
        for (name, value) in &self.env {
            request = request.with_env(name.as_str(), value.as_str());
        }
        if let Some(ref user) = self.user {
            request = request.with_user(user.as_str());
        }
        Ok(request)
    }
}

/// Arguments for the `top` subcommand.
#[derive(Debug, Parser)]
pub struct TopArgs {
    /// Container ID or name.
    #[arg(required = true)]
    pub container: String,
}

/// Split `KEY=VALUE` at the first `=`.
fn parse_pair(raw: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    if key.is_empty() {
        return Err(format!("missing key in '{raw}'"));
    }
    Ok((String::from(key), String::from(value)))
}
