//! Parameters for starting a detached container.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::command::MASK_PLACEHOLDER;
use crate::error::{ConfigError, DockhandError};

/// Parameters for [`EngineClient::run`](super::EngineClient::run).
///
/// Paths are stored in host syntax; translation happens once, during
/// argument assembly. Container environment values are secret and are
/// redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct RunRequest {
    image: String,
    extra_args: Option<String>,
    workdir: Option<String>,
    volumes: BTreeMap<String, String>,
    volumes_from: BTreeSet<String>,
    container_env: BTreeMap<String, String>,
    user: String,
    command: Vec<String>,
}

impl RunRequest {
    /// Create a request for `image`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingRequired` when `image` is empty or
    /// whitespace-only.
    pub fn new(image: impl Into<String>) -> Result<Self, DockhandError> {
        let image_value = image.into();
        let trimmed = image_value.trim();
        if trimmed.is_empty() {
            return Err(DockhandError::from(ConfigError::MissingRequired {
                field: String::from("image"),
            }));
        }

        Ok(Self {
            image: String::from(trimmed),
            extra_args: None,
            workdir: None,
            volumes: BTreeMap::new(),
            volumes_from: BTreeSet::new(),
            container_env: BTreeMap::new(),
            user: String::new(),
            command: Vec::new(),
        })
    }

    /// Attach raw extra arguments, split shell-style at assembly time.
    ///
    /// The text is passed through verbatim; callers are responsible for not
    /// forwarding untrusted input.
    #[must_use]
    pub fn with_extra_args(mut self, args: Option<String>) -> Self {
        self.extra_args = args.filter(|value| !value.trim().is_empty());
        self
    }

    /// Set the working directory inside the container.
    #[must_use]
    pub fn with_workdir(mut self, workdir: Option<String>) -> Self {
        self.workdir = workdir;
        self
    }

    /// Add a host-path to container-path mount.
    #[must_use]
    pub fn with_volume(mut self, host: impl Into<String>, container: impl Into<String>) -> Self {
        self.volumes.insert(host.into(), container.into());
        self
    }

    /// Inherit the volumes of another container.
    #[must_use]
    pub fn with_volumes_from(mut self, container_id: impl Into<String>) -> Self {
        self.volumes_from.insert(container_id.into());
        self
    }

    /// Add a container environment variable.
    #[must_use]
    pub fn with_env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.container_env.insert(name.into(), value.into());
        self
    }

    /// Set the user the container process runs as.
    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Set the command run inside the container.
    #[must_use]
    pub fn with_command(mut self, command: Vec<String>) -> Self {
        self.command = command;
        self
    }

    /// Return the image.
    #[must_use]
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Return the raw extra arguments.
    #[must_use]
    pub fn extra_args(&self) -> Option<&str> {
        self.extra_args.as_deref()
    }

    /// Return the working directory in host syntax.
    #[must_use]
    pub fn workdir(&self) -> Option<&str> {
        self.workdir.as_deref()
    }

    /// Return the mounts in host syntax.
    #[must_use]
    pub const fn volumes(&self) -> &BTreeMap<String, String> {
        &self.volumes
    }

    /// Return the containers whose volumes are inherited.
    #[must_use]
    pub const fn volumes_from(&self) -> &BTreeSet<String> {
        &self.volumes_from
    }

    /// Return the container environment.
    #[must_use]
    pub const fn container_env(&self) -> &BTreeMap<String, String> {
        &self.container_env
    }

    /// Return the user.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Return the command.
    #[must_use]
    pub fn command(&self) -> &[String] {
        &self.command
    }
}

impl fmt::Debug for RunRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted_env: BTreeMap<&str, &str> = self
            .container_env
            .keys()
            .map(|name| (name.as_str(), MASK_PLACEHOLDER))
            .collect();
        f.debug_struct("RunRequest")
            .field("image", &self.image)
            .field("extra_args", &self.extra_args)
            .field("workdir", &self.workdir)
            .field("volumes", &self.volumes)
            .field("volumes_from", &self.volumes_from)
            .field("container_env", &redacted_env)
            .field("user", &self.user)
            .field("command", &self.command)
            .finish()
    }
}
