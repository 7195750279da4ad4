//! Error types for script sessions.

use rslua_station::DeviceId;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or running a device script.
///
/// | Variant | Clears script path | Session afterwards |
/// |---------|--------------------|--------------------|
/// | `FileAccess` | yes | `Error`, no interpreter |
/// | `Compile` | yes | `Error`, interpreter closed |
/// | `Runtime` | yes | `Error`, interpreter closed |
/// | `UnknownDevice` | no | `Closed` |
/// | `Lua` | no | `Error`, interpreter closed |
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Script file missing or unreadable.
    #[error("can't open file: {path}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Script failed to compile.
    #[error("error when loading file: {0}")]
    Compile(String),

    /// Top-level run of the script failed.
    #[error("error when running main: {0}")]
    Runtime(String),

    /// The session's device no longer resolves.
    #[error("unknown component: {0}")]
    UnknownDevice(DeviceId),

    /// Interpreter setup failed.
    #[error("lua error: {0}")]
    Lua(#[from] mlua::Error),
}

impl ScriptError {
    /// Creates a file access error.
    pub fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if the stored script path must be cleared so the user
    /// notices and picks the file again.
    #[must_use]
    pub fn clears_path(&self) -> bool {
        matches!(
            self,
            Self::FileAccess { .. } | Self::Compile(_) | Self::Runtime(_)
        )
    }

    /// Returns `true` if fixing the script (or the path) and reloading can succeed.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::UnknownDevice(_))
    }
}
