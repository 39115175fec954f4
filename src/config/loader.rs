//! Configuration loading with layered precedence.
//!
//! Layers are composed manually with `MergeComposer` (lowest to highest):
//! application defaults, configuration file, environment variables,
//! command-line arguments. Subcommand dispatch stays with clap's `Cli`, so the
//! derive-generated `load()` cannot own argument parsing here.
//!
//! # Environment Variable Handling
//!
//! Typed variables fail fast: `DOCKHAND_ENGINE_TIMEOUT_SECS=soon` or
//! `DOCKHAND_ENGINE_PATH_STYLE=mac` is an error rather than a silent
//! fallback to the default. String variables are always accepted.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use clap::ValueEnum;
use ortho_config::discovery::ConfigDiscovery;
use ortho_config::serde_json::{self, Map, Value};
use ortho_config::{MergeComposer, toml};

use crate::config::{AppConfig, Cli};
use crate::engine::PathStyle;
use crate::error::{ConfigError, Result};

/// The type of value expected from an environment variable.
#[derive(Clone, Copy)]
enum EnvVarType {
    /// String value (always accepted).
    String,
    /// Unsigned 64-bit integer.
    U64,
    /// `posix` or `windows`, case-insensitive.
    PathStyle,
}

/// Specification for a single environment variable mapping.
struct EnvVarSpec {
    env_var: &'static str,
    path: &'static [&'static str],
    var_type: EnvVarType,
}

const ENV_VAR_SPECS: &[EnvVarSpec] = &[
    EnvVarSpec {
        env_var: "DOCKHAND_ENGINE_HOST",
        path: &["engine_host"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "DOCKHAND_ENGINE_BINARY",
        path: &["engine", "binary"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "DOCKHAND_ENGINE_PATH_STYLE",
        path: &["engine", "path_style"],
        var_type: EnvVarType::PathStyle,
    },
    EnvVarSpec {
        env_var: "DOCKHAND_ENGINE_TIMEOUT_SECS",
        path: &["engine", "timeout_secs"],
        var_type: EnvVarType::U64,
    },
];

/// Returns the environment variable names recognised by the config loader.
///
/// Tests use this to clear every `DOCKHAND_*` variable without keeping a
/// second list in sync.
#[must_use]
pub fn env_var_names() -> Vec<&'static str> {
    ENV_VAR_SPECS.iter().map(|spec| spec.env_var).collect()
}

/// Read a TOML configuration file through `cap_std` and push it as a layer.
fn load_config_file(path: &Utf8Path, composer: &mut MergeComposer) -> Result<()> {
    let parent = path
        .parent()
        .filter(|dir| !dir.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path.file_name().unwrap_or(path.as_str());

    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|e| {
        ConfigError::ParseError {
            message: format!("failed to open directory {parent}: {e}"),
        }
    })?;

    let content = dir
        .read_to_string(file_name)
        .map_err(|e| ConfigError::ParseError {
            message: format!("failed to read {path}: {e}"),
        })?;

    let value = toml::from_str::<Value>(&content).map_err(|e| ConfigError::ParseError {
        message: format!("failed to parse {path}: {e}"),
    })?;

    composer.push_file(value, Some(path.to_path_buf()));
    Ok(())
}

/// Load configuration from the process environment with full layer precedence.
///
/// # Errors
///
/// Returns `ConfigError` for malformed configuration files, invalid typed
/// environment values, or a merged configuration that cannot drive the
/// engine (blank binary, zero timeout).
pub fn load_config(cli: &Cli) -> Result<AppConfig> {
    load_config_with_env(cli, &mockable::DefaultEnv::new())
}

/// Load configuration, reading environment variables through `env`.
///
/// # Errors
///
/// See [`load_config`].
pub fn load_config_with_env<E: mockable::Env>(cli: &Cli, env: &E) -> Result<AppConfig> {
    let mut composer = MergeComposer::new();

    let defaults =
        serde_json::to_value(AppConfig::default()).map_err(|e| ConfigError::ParseError {
            message: format!("failed to serialise defaults: {e}"),
        })?;
    composer.push_defaults(defaults);

    if let Some(path) = discover_config_path(cli, env) {
        load_config_file(&path, &mut composer)?;
    }

    let env_values = collect_env_vars(env)?;
    if !env_values.is_null() {
        composer.push_environment(env_values);
    }

    let cli_overrides = build_cli_overrides(cli);
    if !cli_overrides.is_null() {
        composer.push_cli(cli_overrides);
    }

    let mut config =
        AppConfig::merge_from_layers(composer.layers()).map_err(ConfigError::OrthoConfig)?;
    config.normalise();
    config.engine.validate()?;
    Ok(config)
}

/// Return the CLI-provided path if it exists, else the first discovered file.
fn discover_config_path<E: mockable::Env>(cli: &Cli, env: &E) -> Option<Utf8PathBuf> {
    cli.config
        .clone()
        .filter(|path| path.exists())
        .or_else(|| {
            env.string("DOCKHAND_CONFIG_PATH")
                .map(Utf8PathBuf::from)
                .filter(|path| path.exists())
        })
        .or_else(|| {
            ConfigDiscovery::builder("dockhand")
                .config_file_name("config.toml")
                .dotfile_name(".dockhand.toml")
                .build()
                .candidates()
                .into_iter()
                .filter(|path| path.exists())
                .find_map(|path| Utf8PathBuf::try_from(path).ok())
        })
}

/// Collect `DOCKHAND_*` variables into a JSON layer.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` for an unparseable typed value.
fn collect_env_vars<E: mockable::Env>(env: &E) -> Result<Value> {
    let mut root = Map::new();

    for spec in ENV_VAR_SPECS {
        let Some(raw_value) = env.string(spec.env_var) else {
            continue;
        };
        let json_value = parse_env_value(spec, raw_value)?;
        insert_at_path(&mut root, spec.path, json_value);
    }

    if root.is_empty() {
        Ok(Value::Null)
    } else {
        Ok(Value::Object(root))
    }
}

fn parse_env_value(spec: &EnvVarSpec, raw_value: String) -> Result<Value> {
    match spec.var_type {
        EnvVarType::String => Ok(Value::String(raw_value)),
        EnvVarType::U64 => raw_value
            .trim()
            .parse::<u64>()
            .map(|n| Value::Number(n.into()))
            .map_err(|_| invalid(spec, format!("expected unsigned integer, got '{raw_value}'"))),
        EnvVarType::PathStyle => PathStyle::from_str(raw_value.trim(), true)
            .map_err(|_| invalid(spec, format!("expected posix or windows, got '{raw_value}'")))
            .and_then(|style| {
                serde_json::to_value(style).map_err(|e| invalid(spec, e.to_string()))
            }),
    }
}

fn invalid(spec: &EnvVarSpec, reason: String) -> crate::error::DockhandError {
    ConfigError::InvalidValue {
        field: String::from(spec.env_var),
        reason,
    }
    .into()
}

/// Insert a value at a nested path in a JSON map, creating parents.
fn insert_at_path(root: &mut Map<String, Value>, path: &[&str], value: Value) {
    let Some((&field, parents)) = path.split_last() else {
        return;
    };

    let mut current = root;
    for &segment in parents {
        let entry = current
            .entry(String::from(segment))
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(obj) = entry.as_object_mut() else {
            return;
        };
        current = obj;
    }

    current.insert(String::from(field), value);
}

/// Build a JSON layer from the global CLI flags.
fn build_cli_overrides(cli: &Cli) -> Value {
    let mut overrides = Map::new();

    if let Some(ref host) = cli.engine_host {
        insert_at_path(&mut overrides, &["engine_host"], Value::String(host.clone()));
    }
    if let Some(ref binary) = cli.engine_binary {
        insert_at_path(
            &mut overrides,
            &["engine", "binary"],
            Value::String(binary.clone()),
        );
    }
    if let Some(style) = cli.path_style
        && let Ok(value) = serde_json::to_value(style)
    {
        insert_at_path(&mut overrides, &["engine", "path_style"], value);
    }

    if overrides.is_empty() {
        Value::Null
    } else {
        Value::Object(overrides)
    }
}
