//! Configuration system for dockhand.
//!
//! Configuration is merged by `ortho_config` with precedence: CLI flags
//! override environment variables, which override configuration files, which
//! override defaults. The file is expected at
//! `~/.config/dockhand/config.toml` by default.
//!
//! # Example Configuration
//!
//! ```toml
//! engine_host = "unix:///run/user/1000/podman/podman.sock"
//!
//! [engine]
//! binary = "podman"
//! path_style = "posix"
//! timeout_secs = 300
//! ```

mod cli;
mod loader;
mod types;


pub use cli::{Cli, Commands, RunArgs, TopArgs};
pub use loader::{env_var_names, load_config, load_config_with_env};
pub use types::{AppConfig, DEFAULT_ENGINE_BINARY, EngineConfig};
