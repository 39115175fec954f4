//! Host path to engine path translation.
//!
//! The engine CLI on a Windows host expects mount sources and working
//! directories in a rooted, colon-free form (`c:/data` becomes `/c/data`).
//! On other hosts paths pass through untouched.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Path syntax accepted by the engine CLI on the target host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathStyle {
    /// Paths are passed through unchanged.
    #[default]
    Posix,
    /// Drive-letter colons are stripped and multi-segment paths are rooted.
    Windows,
}

impl PathStyle {
    /// Return the style matching the platform this binary was built for.
    #[must_use]
    pub const fn host() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Posix
        }
    }

    /// Translate a host path into the syntax the engine CLI expects.
    ///
    /// Translation is total and idempotent.
    #[must_use]
    pub fn translate(self, path: &str) -> EnginePath {
        match self {
            Self::Posix => EnginePath(String::from(path)),
            Self::Windows => EnginePath(windows_engine_path(path)),
        }
    }
}

/// A path that has already been translated for the engine CLI.
///
/// Only [`PathStyle::translate`] constructs this type, so argument assembly
/// cannot receive a path that skipped translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnginePath(String);

impl EnginePath {
    /// Borrow the translated path.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the translated path.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for EnginePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn windows_engine_path(path: &str) -> String {
    let stripped: String = path.chars().filter(|&c| c != ':').collect();
    if !stripped.starts_with('/') && stripped.contains('/') {
        format!("/{stripped}")
    } else {
        stripped
    }
}
