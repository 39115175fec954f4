//! Engine connection environment for launched commands.
//!
//! The engine CLI finds its daemon through a handful of environment
//! variables. Only these are forwarded into the launch environment, so a
//! `run` never leaks unrelated host variables into the recorded command.

use super::executor::LaunchEnv;

/// Variable naming the engine endpoint.
pub const ENGINE_HOST_VAR: &str = "DOCKER_HOST";

/// Environment variables forwarded to the engine CLI, in lookup order.
pub const ENGINE_ENV_VARS: &[&str] = &[
    ENGINE_HOST_VAR,
    "DOCKER_TLS_VERIFY",
    "DOCKER_CERT_PATH",
    "DOCKER_CONFIG",
    "DOCKER_CONTEXT",
];

/// Builds the [`LaunchEnv`] for engine commands from the host environment.
///
/// # Type Parameters
///
/// * `E` - An environment provider implementing `mockable::Env`.
pub struct LaunchEnvResolver<'a, E: mockable::Env> {
    env: &'a E,
}

impl<'a, E: mockable::Env> LaunchEnvResolver<'a, E> {
    /// Create a resolver over the given environment provider.
    #[must_use]
    pub const fn new(env: &'a E) -> Self {
        Self { env }
    }

    /// Collect the non-empty engine variables.
    ///
    /// A configured `engine_host` replaces whatever `DOCKER_HOST` holds.
    #[must_use]
    pub fn resolve(&self, engine_host: Option<&str>) -> LaunchEnv {
        let mut launch_env: LaunchEnv = ENGINE_ENV_VARS
            .iter()
            .filter_map(|name| {
                self.env
                    .string(name)
                    .filter(|value| !value.is_empty())
                    .map(|value| (String::from(*name), value))
            })
            .collect();

        if let Some(host) = engine_host.filter(|host| !host.is_empty()) {
            launch_env.insert(String::from(ENGINE_HOST_VAR), String::from(host));
        }
        launch_env
    }
}
