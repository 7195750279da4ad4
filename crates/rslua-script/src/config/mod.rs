//! Bridge configuration.
//!
//! # Load Order
//!
//! 1. Default values (compile-time)
//! 2. Config file (TOML, optional)
//! 3. Environment variables (`RSLUA_*`)
//!
//! Each layer overrides the previous.
//!
//! # Environment Variables
//!
//! | Variable | Config Field | Type |
//! |----------|--------------|------|
//! | `RSLUA_LOG_PREFIX` | `log_prefix` | String |
//! | `RSLUA_REFRESH_MARKER` | `refresh_marker` | String |
//! | `RSLUA_REFRESH_DEBOUNCE_MS` | `refresh_debounce_ms` | u64 |
//! | `RSLUA_WARN_ACYCLIC` | `warn_acyclic_connections` | bool |
//!
//! # Example Configuration
//!
//! ```toml
//! log_prefix = "LuaScript"
//! refresh_marker = "Update LuaScript"
//! refresh_debounce_ms = 1000
//! warn_acyclic_connections = true
//! ```

mod error;
mod loader;

pub use error::ConfigError;
pub use loader::ConfigLoader;

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default prefix of every host log message written by the bridge.
pub const DEFAULT_LOG_PREFIX: &str = "LuaScript";

/// Default host log marker that triggers a refresh of all devices.
pub const DEFAULT_REFRESH_MARKER: &str = "Update LuaScript";

/// Default minimum interval between two refresh broadcasts.
pub const DEFAULT_REFRESH_DEBOUNCE_MS: u64 = 1000;

/// Scripting bridge configuration.
///
/// ```
/// use rslua_script::ScriptConfig;
///
/// let config = ScriptConfig::default();
/// assert_eq!(config.log_prefix, "LuaScript");
/// assert_eq!(config.refresh_debounce().as_millis(), 1000);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScriptConfig {
    /// Prefix of host log messages. Messages starting with it are never
    /// treated as refresh requests.
    pub log_prefix: String,

    /// Host log text that re-dispatches IO-signal updates to every device.
    pub refresh_marker: String,

    /// Minimum interval between two refresh broadcasts, in milliseconds.
    pub refresh_debounce_ms: u64,

    /// Warn after loading when a connection touching the device does not
    /// allow cycles.
    pub warn_acyclic_connections: bool,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            log_prefix: DEFAULT_LOG_PREFIX.to_string(),
            refresh_marker: DEFAULT_REFRESH_MARKER.to_string(),
            refresh_debounce_ms: DEFAULT_REFRESH_DEBOUNCE_MS,
            warn_acyclic_connections: true,
        }
    }
}

impl ScriptConfig {
    /// Deserializes from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if the TOML is malformed or a field has the wrong type.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Serializes to a TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    #[must_use]
    pub fn refresh_debounce(&self) -> Duration {
        Duration::from_millis(self.refresh_debounce_ms)
    }
}
