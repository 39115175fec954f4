//! Configuration data types for dockhand.

use std::time::Duration;

use ortho_config::{OrthoConfig, OrthoResult, PostMergeContext, PostMergeHook};
use serde::{Deserialize, Serialize};

use crate::engine::{DEFAULT_TIMEOUT_SECS, PathStyle};
use crate::error::{ConfigError, Result};

/// Engine binary invoked when none is configured.
pub const DEFAULT_ENGINE_BINARY: &str = "docker";

/// Engine command-line tool configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Engine binary name or path.
    pub binary: String,

    /// Path syntax the engine CLI expects. Unset means the host platform's.
    pub path_style: Option<PathStyle>,

    /// Seconds to wait for any single engine command.
    pub timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary: String::from(DEFAULT_ENGINE_BINARY),
            path_style: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl EngineConfig {
    /// Return the configured path style, falling back to the host's.
    #[must_use]
    pub fn resolved_path_style(&self) -> PathStyle {
        self.path_style.unwrap_or_else(PathStyle::host)
    }

    /// Return the command timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check that the engine settings can drive a command.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingRequired` for a blank binary and
    /// `ConfigError::InvalidValue` for a zero timeout.
    pub fn validate(&self) -> Result<()> {
        if self.binary.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: String::from("engine.binary"),
            }
            .into());
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: String::from("engine.timeout_secs"),
                reason: String::from("must be at least one second"),
            }
            .into());
        }
        Ok(())
    }
}

/// Root application configuration.
///
/// Loaded with layered precedence (lowest to highest): defaults,
/// configuration file, environment variables, command-line arguments.
///
/// Configuration files are discovered in this order:
/// 1. Path specified via `DOCKHAND_CONFIG_PATH` environment variable
/// 2. `.dockhand.toml` in the current working directory
/// 3. `.dockhand.toml` in the home directory
/// 4. `~/.config/dockhand/config.toml` (XDG default)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(
    prefix = "DOCKHAND",
    post_merge_hook,
    discovery(
        app_name = "dockhand",
        env_var = "DOCKHAND_CONFIG_PATH",
        config_file_name = "config.toml",
        dotfile_name = ".dockhand.toml",
        config_cli_long = "config",
        config_cli_visible = true,
    )
)]
pub struct AppConfig {
    /// Engine endpoint, forwarded to the engine CLI as `DOCKER_HOST`.
    pub engine_host: Option<String>,

    /// Engine command-line tool configuration.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub engine: EngineConfig,
}

impl AppConfig {
    /// Trim engine values and drop a blank engine host. Idempotent.
    pub fn normalise(&mut self) {
        self.engine_host = self
            .engine_host
            .take()
            .map(|host| String::from(host.trim()))
            .filter(|host| !host.is_empty());
        self.engine.binary = String::from(self.engine.binary.trim());
    }
}

impl PostMergeHook for AppConfig {
    fn post_merge(&mut self, _ctx: &PostMergeContext) -> OrthoResult<()> {
        self.normalise();
        Ok(())
    }
}
